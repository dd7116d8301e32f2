//! Qualitative labels shared by the analysis reports.

/// Declares a fieldless enum whose variants render (and serialize) as fixed
/// upper-case labels such as `BULLISH` or `STRONG_BUY`.
macro_rules! label_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use label_enum;

label_enum! {
    /// Whether a quantity rose or fell against the previous row.
    Direction {
        Increasing => "INCREASING",
        Decreasing => "DECREASING",
    }
}

impl Direction {
    pub fn of(current: f64, previous: f64) -> Self {
        if current > previous {
            Direction::Increasing
        } else {
            Direction::Decreasing
        }
    }
}
