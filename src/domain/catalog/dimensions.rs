//! The seven design axes every project template is configured along.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! axis {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Human-readable name.
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.label())
            }
        }
    };
}

axis!(
    /// How long the project runs.
    DurationClass {
        Sprint => "Sprint (1-3 days)",
        Unit => "Unit (1-4 weeks)",
        Journey => "Journey (6-12 weeks)",
        Campaign => "Campaign (semester or year)",
    }
);

axis!(
    /// How students are grouped.
    SocialStructure {
        Individual => "Individual",
        Collaborative => "Collaborative",
        CommunityConnected => "Community Connected",
        Networked => "Networked",
    }
);

axis!(
    /// Depth of thinking required.
    CognitiveComplexity {
        Application => "Application",
        Analysis => "Analysis",
        Synthesis => "Synthesis",
        Evaluation => "Evaluation",
    }
);

axis!(
    /// Strength of the real-world connection.
    AuthenticityLevel {
        Simulated => "Simulated",
        Anchored => "Anchored",
        Applied => "Applied",
        Impact => "Impact",
    }
);

axis!(
    /// Amount of teacher support.
    ScaffoldingIntensity {
        Guided => "Guided",
        Facilitated => "Facilitated",
        Independent => "Independent",
        Mentored => "Mentored",
    }
);

axis!(
    /// Sophistication of what students produce.
    ProductComplexity {
        Artifact => "Artifact",
        Portfolio => "Portfolio",
        System => "System",
        Experience => "Experience",
    }
);

axis!(
    /// How the project is delivered.
    DeliveryMode {
        FaceToFace => "Face to Face",
        SynchronousRemote => "Synchronous Remote",
        AsynchronousRemote => "Asynchronous Remote",
        Hybrid => "Hybrid",
    }
);
