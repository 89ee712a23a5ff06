//! Catalog module - project templates and the design axes they are
//! configured along.

mod configuration;
mod dimensions;
mod template;

pub use configuration::{classify_duration, DimensionalConfiguration};
pub use dimensions::{
    AuthenticityLevel, CognitiveComplexity, DeliveryMode, DurationClass, ProductComplexity,
    ScaffoldingIntensity, SocialStructure,
};
pub use template::{
    evaluate_fit, rank_templates, CompatibilityMatrix, ComplexityTier, Template, TemplateFit,
    TemplateIntent,
};
