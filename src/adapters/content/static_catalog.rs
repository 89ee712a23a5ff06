//! Built-in project template catalogue.

use once_cell::sync::Lazy;

use crate::domain::catalog::{
    AuthenticityLevel as Auth, CognitiveComplexity as Cog, CompatibilityMatrix, ComplexityTier,
    DeliveryMode as Delivery, DurationClass as Dur, ProductComplexity as Product,
    ScaffoldingIntensity as Scaffold, SocialStructure as Social, Template, TemplateIntent,
};
use crate::ports::ContentStore;

static TEMPLATES: Lazy<Vec<Template>> = Lazy::new(build_catalog);

/// Read-only content store over the fourteen built-in templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticContentCatalog;

impl StaticContentCatalog {
    pub fn new() -> Self {
        Self
    }
}

impl ContentStore for StaticContentCatalog {
    fn list_templates(&self) -> Vec<Template> {
        TEMPLATES.clone()
    }

    fn get_template(&self, template_id: &str) -> Option<Template> {
        TEMPLATES
            .iter()
            .find(|t| t.template_id == template_id)
            .cloned()
    }
}

struct Spec {
    id: &'static str,
    intent: TemplateIntent,
    name: &'static str,
    description: &'static str,
    driving_question: &'static str,
    strengths: &'static [&'static str],
    subjects: &'static [&'static str],
    complexity: ComplexityTier,
    matrix: CompatibilityMatrix,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn build(spec: Spec) -> Template {
    Template {
        template_id: spec.id.to_string(),
        intent: spec.intent,
        display_name: spec.name.to_string(),
        description: spec.description.to_string(),
        driving_question_template: spec.driving_question.to_string(),
        strengths: strings(spec.strengths),
        subject_areas: strings(spec.subjects),
        complexity: spec.complexity,
        compatibility: spec.matrix,
    }
}

const ALL_DURATIONS: [Dur; 4] = [Dur::Sprint, Dur::Unit, Dur::Journey, Dur::Campaign];
const SHORT_DURATIONS: [Dur; 2] = [Dur::Sprint, Dur::Unit];

fn build_catalog() -> Vec<Template> {
    vec![
        build(Spec {
            id: "scientific_inquiry",
            intent: TemplateIntent::ScientificInquiry,
            name: "Scientific Inquiry Project",
            description: "Students design and conduct scientific investigations following the scientific method",
            driving_question: "How can we use an experiment to answer [our science question]?",
            strengths: &["experimentation", "data_analysis", "scientific_method", "research"],
            subjects: &["science", "mathematics"],
            complexity: ComplexityTier::Medium,
            matrix: CompatibilityMatrix {
                duration: ALL_DURATIONS.to_vec(),
                social_structure: vec![Social::Individual, Social::Collaborative],
                cognitive_complexity: vec![Cog::Analysis, Cog::Evaluation],
                authenticity: vec![Auth::Anchored, Auth::Applied],
                scaffolding: vec![Scaffold::Facilitated, Scaffold::Mentored],
                product_complexity: vec![Product::Portfolio, Product::Experience],
                delivery_mode: vec![Delivery::FaceToFace, Delivery::SynchronousRemote],
            },
        }),
        build(Spec {
            id: "engineering_design",
            intent: TemplateIntent::EngineeringDesign,
            name: "Engineering Design Challenge",
            description: "Students identify problems and design, build, and test solutions through iterative prototyping",
            driving_question: "How can we address [specific community problem] to create positive change in our community?",
            strengths: &["design_thinking", "hands_on", "prototyping", "iteration"],
            subjects: &["science", "engineering", "mathematics"],
            complexity: ComplexityTier::High,
            matrix: CompatibilityMatrix {
                duration: ALL_DURATIONS.to_vec(),
                social_structure: vec![
                    Social::Collaborative,
                    Social::CommunityConnected,
                    Social::Networked,
                ],
                cognitive_complexity: vec![Cog::Analysis, Cog::Synthesis, Cog::Evaluation],
                authenticity: vec![Auth::Anchored, Auth::Applied, Auth::Impact],
                scaffolding: vec![
                    Scaffold::Facilitated,
                    Scaffold::Independent,
                    Scaffold::Mentored,
                ],
                product_complexity: vec![Product::Portfolio, Product::System, Product::Experience],
                delivery_mode: vec![
                    Delivery::FaceToFace,
                    Delivery::Hybrid,
                    Delivery::SynchronousRemote,
                ],
            },
        }),
        build(Spec {
            id: "mathematical_modeling",
            intent: TemplateIntent::MathematicalModeling,
            name: "Mathematical Modeling",
            description: "Students apply mathematical concepts to model and analyze real-world situations",
            driving_question: "How can we use math to [solve or explore a problem] in our world?",
            strengths: &["problem_solving", "data_analysis", "modeling", "mathematical_thinking"],
            subjects: &["mathematics"],
            complexity: ComplexityTier::High,
            matrix: CompatibilityMatrix {
                duration: ALL_DURATIONS.to_vec(),
                social_structure: vec![Social::Individual, Social::Collaborative],
                cognitive_complexity: vec![Cog::Analysis, Cog::Synthesis],
                authenticity: vec![Auth::Anchored, Auth::Applied],
                scaffolding: vec![Scaffold::Facilitated, Scaffold::Mentored],
                product_complexity: vec![Product::System, Product::Portfolio],
                delivery_mode: vec![Delivery::FaceToFace, Delivery::SynchronousRemote],
            },
        }),
        build(Spec {
            id: "research_investigation",
            intent: TemplateIntent::ResearchInvestigation,
            name: "Research Investigation",
            description: "Students conduct in-depth research on academic topics using scholarly sources",
            driving_question: "How can we investigate [our science question] to find an answer?",
            strengths: &["research", "critical_analysis", "academic_writing", "presentation"],
            subjects: &["english_language_arts", "social_studies", "science"],
            complexity: ComplexityTier::High,
            matrix: CompatibilityMatrix {
                duration: ALL_DURATIONS.to_vec(),
                social_structure: vec![Social::Individual, Social::Collaborative],
                cognitive_complexity: vec![Cog::Analysis, Cog::Evaluation],
                authenticity: vec![Auth::Anchored, Auth::Applied],
                scaffolding: vec![Scaffold::Facilitated, Scaffold::Mentored],
                product_complexity: vec![Product::Portfolio, Product::System],
                delivery_mode: vec![Delivery::FaceToFace, Delivery::SynchronousRemote],
            },
        }),
        build(Spec {
            id: "historical_inquiry",
            intent: TemplateIntent::HistoricalInquiry,
            name: "Historical Investigation",
            description: "Students investigate historical questions using primary sources and historical thinking skills",
            driving_question: "What can we learn from [person/place/event] about life long ago?",
            strengths: &["research", "analysis", "historical_thinking", "writing"],
            subjects: &["social_studies", "history"],
            complexity: ComplexityTier::Medium,
            matrix: CompatibilityMatrix {
                duration: ALL_DURATIONS.to_vec(),
                social_structure: vec![Social::Individual, Social::Collaborative],
                cognitive_complexity: vec![Cog::Analysis, Cog::Synthesis],
                authenticity: vec![Auth::Anchored, Auth::Applied],
                scaffolding: vec![Scaffold::Facilitated, Scaffold::Mentored],
                product_complexity: vec![Product::Portfolio, Product::Experience],
                delivery_mode: vec![Delivery::FaceToFace, Delivery::SynchronousRemote],
            },
        }),
        build(Spec {
            id: "community_action",
            intent: TemplateIntent::CommunityAction,
            name: "Community Action Project",
            description: "Students identify local issues, research root causes, and develop actionable solutions with community stakeholders",
            driving_question: "How can we take action on [local issue] to improve our community?",
            strengths: &[
                "civic_engagement",
                "research",
                "stakeholder_collaboration",
                "public_presentation",
                "community_connection",
            ],
            subjects: &["social_studies", "english_language_arts", "civics"],
            complexity: ComplexityTier::High,
            matrix: CompatibilityMatrix {
                duration: ALL_DURATIONS.to_vec(),
                social_structure: vec![
                    Social::Collaborative,
                    Social::CommunityConnected,
                    Social::Networked,
                ],
                cognitive_complexity: vec![Cog::Analysis, Cog::Synthesis, Cog::Evaluation],
                authenticity: vec![Auth::Applied, Auth::Impact],
                scaffolding: vec![
                    Scaffold::Facilitated,
                    Scaffold::Independent,
                    Scaffold::Mentored,
                ],
                product_complexity: vec![Product::Portfolio, Product::System, Product::Experience],
                delivery_mode: vec![
                    Delivery::FaceToFace,
                    Delivery::Hybrid,
                    Delivery::SynchronousRemote,
                ],
            },
        }),
        build(Spec {
            id: "creative_expression",
            intent: TemplateIntent::CreativeExpression,
            name: "Creative Expression Project",
            description: "Students explore ideas through art and creative work shared with authentic audiences",
            driving_question: "How can we use [drawing, music, drama, or digital tools] to share our theme in a fun way?",
            strengths: &["artistic_creation", "self_expression", "reflection", "presentation"],
            subjects: &["arts", "english_language_arts"],
            complexity: ComplexityTier::Low,
            matrix: CompatibilityMatrix {
                duration: SHORT_DURATIONS.to_vec(),
                social_structure: vec![Social::Individual, Social::Collaborative],
                cognitive_complexity: vec![Cog::Application],
                authenticity: vec![Auth::Anchored],
                scaffolding: vec![Scaffold::Guided, Scaffold::Facilitated],
                product_complexity: vec![Product::Artifact],
                delivery_mode: vec![Delivery::FaceToFace],
            },
        }),
        build(Spec {
            id: "technology_focused",
            intent: TemplateIntent::TechnologyFocused,
            name: "Technology Focused Project",
            description: "Students explore coding and technology through creating simple digital projects",
            driving_question: "How can we use [coding or simple electronics] to [solve a fun challenge] in a way that others can use or enjoy?",
            strengths: &["coding", "digital_creation", "problem_solving", "presentation"],
            subjects: &["technology", "computer_science"],
            complexity: ComplexityTier::Medium,
            matrix: CompatibilityMatrix {
                duration: SHORT_DURATIONS.to_vec(),
                social_structure: vec![Social::Collaborative, Social::Individual],
                cognitive_complexity: vec![Cog::Application],
                authenticity: vec![Auth::Anchored],
                scaffolding: vec![Scaffold::Guided, Scaffold::Facilitated],
                product_complexity: vec![Product::Artifact],
                delivery_mode: vec![Delivery::FaceToFace],
            },
        }),
        build(Spec {
            id: "service_learning",
            intent: TemplateIntent::ServiceLearning,
            name: "Service Learning Project",
            description: "Students engage in hands-on service activities while developing empathy and teamwork skills",
            driving_question: "How can we [help our community/home/school] by doing a simple service project?",
            strengths: &["hands_on", "empathy", "teamwork", "reflection"],
            subjects: &["social_studies", "character_education"],
            complexity: ComplexityTier::Low,
            matrix: CompatibilityMatrix {
                duration: SHORT_DURATIONS.to_vec(),
                social_structure: vec![Social::Collaborative],
                cognitive_complexity: vec![Cog::Application],
                authenticity: vec![Auth::Anchored],
                scaffolding: vec![Scaffold::Guided],
                product_complexity: vec![Product::Experience],
                delivery_mode: vec![Delivery::FaceToFace],
            },
        }),
        build(Spec {
            id: "interdisciplinary",
            intent: TemplateIntent::Interdisciplinary,
            name: "Interdisciplinary Integration",
            description: "Students explore complex topics through multiple subject lenses and connections",
            driving_question: "How can we use [Subject A] and [Subject B] to solve [authentic problem]?",
            strengths: &["cross_curricular", "systems_thinking", "synthesis", "integration"],
            subjects: &["multiple"],
            complexity: ComplexityTier::High,
            matrix: CompatibilityMatrix {
                duration: ALL_DURATIONS.to_vec(),
                social_structure: vec![Social::Collaborative, Social::Networked],
                cognitive_complexity: vec![Cog::Analysis, Cog::Synthesis, Cog::Evaluation],
                authenticity: vec![Auth::Anchored, Auth::Applied],
                scaffolding: vec![Scaffold::Facilitated, Scaffold::Mentored],
                product_complexity: vec![Product::Portfolio, Product::Experience],
                delivery_mode: vec![
                    Delivery::FaceToFace,
                    Delivery::Hybrid,
                    Delivery::SynchronousRemote,
                ],
            },
        }),
        build(Spec {
            id: "skill_application",
            intent: TemplateIntent::SkillApplication,
            name: "Skill Application Project",
            description: "Students practice and demonstrate mastery of specific academic or technical skills",
            driving_question: "How can we use [skill] to [complete a real task] in our world?",
            strengths: &["skill_mastery", "practice", "demonstration", "feedback"],
            subjects: &["career_technical", "mathematics", "language_arts"],
            complexity: ComplexityTier::Low,
            matrix: CompatibilityMatrix {
                duration: vec![Dur::Sprint, Dur::Unit, Dur::Journey],
                social_structure: vec![Social::Individual, Social::Collaborative],
                cognitive_complexity: vec![Cog::Application, Cog::Evaluation],
                authenticity: vec![Auth::Anchored, Auth::Applied],
                scaffolding: vec![Scaffold::Facilitated, Scaffold::Mentored],
                product_complexity: vec![Product::Experience, Product::Portfolio],
                delivery_mode: vec![Delivery::FaceToFace, Delivery::SynchronousRemote],
            },
        }),
        build(Spec {
            id: "design_thinking",
            intent: TemplateIntent::DesignThinking,
            name: "Design Thinking Project",
            description: "Students apply design thinking process to create human-centered solutions",
            driving_question: "How might we design [product or solution] that does [user need]?",
            strengths: &["empathy", "ideation", "prototyping", "user_testing", "design_thinking"],
            subjects: &["technology", "arts", "engineering"],
            complexity: ComplexityTier::Medium,
            matrix: CompatibilityMatrix {
                duration: ALL_DURATIONS.to_vec(),
                social_structure: vec![Social::Collaborative, Social::Networked],
                cognitive_complexity: vec![Cog::Analysis, Cog::Evaluation, Cog::Synthesis],
                authenticity: vec![Auth::Anchored, Auth::Applied],
                scaffolding: vec![Scaffold::Facilitated, Scaffold::Mentored],
                product_complexity: vec![Product::Experience, Product::System],
                delivery_mode: vec![
                    Delivery::FaceToFace,
                    Delivery::Hybrid,
                    Delivery::SynchronousRemote,
                ],
            },
        }),
        build(Spec {
            id: "debate_argumentation",
            intent: TemplateIntent::DebateArgumentation,
            name: "Debate & Argumentation",
            description: "Students research controversial topics and develop structured arguments with evidence",
            driving_question: "Which side of [issue] has the strongest reasons, and why?",
            strengths: &["research", "argumentation", "public_speaking", "critical_thinking"],
            subjects: &["english_language_arts", "social_studies"],
            complexity: ComplexityTier::Medium,
            matrix: CompatibilityMatrix {
                duration: ALL_DURATIONS.to_vec(),
                social_structure: vec![Social::Collaborative, Social::Networked],
                cognitive_complexity: vec![Cog::Analysis, Cog::Evaluation],
                authenticity: vec![Auth::Applied, Auth::Impact],
                scaffolding: vec![Scaffold::Facilitated, Scaffold::Mentored],
                product_complexity: vec![Product::Experience, Product::System],
                delivery_mode: vec![Delivery::FaceToFace, Delivery::SynchronousRemote],
            },
        }),
        build(Spec {
            id: "entrepreneurship",
            intent: TemplateIntent::Entrepreneurship,
            name: "Entrepreneurship Project",
            description: "Students identify real-world problems or opportunities and develop sustainable, viable ventures to address them",
            driving_question: "How might we [solve a real-world problem or seize an opportunity] through a sustainable and viable entrepreneurial venture?",
            strengths: &[
                "market_research",
                "ideation",
                "business_modeling",
                "financial_planning",
                "marketing",
                "pitching",
                "critical_reflection",
            ],
            subjects: &["social_studies", "mathematics", "english_language_arts"],
            complexity: ComplexityTier::High,
            matrix: CompatibilityMatrix {
                duration: ALL_DURATIONS.to_vec(),
                social_structure: vec![Social::Collaborative, Social::Networked],
                cognitive_complexity: vec![Cog::Analysis, Cog::Synthesis, Cog::Evaluation],
                authenticity: vec![Auth::Anchored, Auth::Applied, Auth::Impact],
                scaffolding: vec![Scaffold::Facilitated, Scaffold::Mentored],
                product_complexity: vec![Product::Portfolio, Product::System, Product::Experience],
                delivery_mode: vec![
                    Delivery::FaceToFace,
                    Delivery::Hybrid,
                    Delivery::SynchronousRemote,
                ],
            },
        }),
    ]
}
