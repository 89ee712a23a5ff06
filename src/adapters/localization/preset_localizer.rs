//! Static preset tables for English, Spanish and French.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::domain::foundation::Language;
use crate::domain::localization::Preset;
use crate::ports::Localizer;

const ENGLISH: &[(Preset, &str)] = &[
    (Preset::NeedMoreInfo, "I need more information to help you create your project."),
    (Preset::ProvideMissingSlots, "Could you please provide the {slots}?"),
    (Preset::AllInfoReceived, "Great! I have all the information I need."),
    (Preset::GetStandardsHeader, "\n#### Getting standards recommendations...\n"),
    (Preset::RecommendedStandards, "\n🔖 **Recommended Standards:**\n"),
    (Preset::PrerequisitesPrefix, "\n📌 **Prerequisites:** "),
    (Preset::CrossCurricularPrefix, "\n🔗 **Cross-Curricular Connections:** "),
    (Preset::StandardsFallback, "\n⚠️ Using general standards guidance for this grade.\n"),
    (Preset::GetKgHeader, "\n#### Getting knowledge-graph insights…\n"),
    (Preset::KgInsightsHeader, "\n🔍 **Knowledge-Graph Insights:**\n"),
    (Preset::KgStandardPrefix, "> **Working from standard**: "),
    (Preset::KgFallback, "\n⚠️ Using fallback Knowledge-Graph insights.\n"),
    (Preset::ProjectTopicsHeader, "\n📚 **Project Topics:**\n"),
    (Preset::CrossSubjectsHeader, "🔗 **Cross-Subject Connections:**\n"),
    (Preset::RealWorldHeader, "🌎 **Real-World Applications:**\n"),
    (Preset::ResourcesHeader, "📘 **Curriculum Resources:**\n"),
    (Preset::ImplementationHeader, "💡 **Implementation Ideas:**\n"),
    (Preset::ConfidencePrefix, "✅ **Relevance Confidence:** "),
    (Preset::CreatingOptionsHeader, "\n#### Creating Project Options…\n"),
    (Preset::ProjectOptionsHeader, "\n=== PROJECT OPTIONS ===\n"),
    (Preset::FallbackOptions, "\n⚠️ Could not generate structured options; here is a starting point:\n"),
    (Preset::OptionLabel, "Option"),
    (Preset::RationaleLabel, "• Rationale"),
    (Preset::DrivingQuestionLabel, "• Driving Question"),
    (Preset::EndProductLabel, "• End Product"),
    (Preset::KeySkillsLabel, "• Key Skills"),
    (Preset::LearningObjectivesLabel, "• Learning Objectives"),
    (Preset::AssessmentSummaryLabel, "• Assessment Summary"),
    (Preset::ChoicePrompt, "Please choose an option from 1 to {max}."),
    (Preset::InvalidChoice, "Please select an option between 1 and {max}."),
    (Preset::FullDetailsHeader, "\n🔎 **Full project details:**"),
    (Preset::ProjectReady, "\n🎉 Your project is ready."),
    (Preset::SelectionSaved, "Your project was saved (id: {id})."),
    (Preset::SaveFailed, "Your project is ready, but it could not be saved right now."),
    (Preset::RefineApplying, "Applying your changes…"),
    (Preset::RefineNoChange, "I could not find anything to change for that request."),
    (Preset::RefineSaved, "Saved as a new version (id: {id})."),
    (Preset::RefineNotSaved, "Your changes are ready, but the new version could not be saved."),
];

const SPANISH: &[(Preset, &str)] = &[
    (Preset::NeedMoreInfo, "Necesito más información para ayudarte a crear tu proyecto."),
    (Preset::ProvideMissingSlots, "Por favor proporciona {slots}."),
    (Preset::AllInfoReceived, "¡Genial! Tengo toda la información que necesito."),
    (Preset::GetStandardsHeader, "\n#### Obteniendo recomendaciones de estándares...\n"),
    (Preset::RecommendedStandards, "\n🔖 **Estándares recomendados:**\n"),
    (Preset::PrerequisitesPrefix, "\n📌 **Prerrequisitos:** "),
    (Preset::CrossCurricularPrefix, "\n🔗 **Conexiones interdisciplinarias:** "),
    (Preset::StandardsFallback, "\n⚠️ Usando orientación general de estándares para este grado.\n"),
    (Preset::GetKgHeader, "\n#### Obteniendo ideas del grafo de conocimientos…\n"),
    (Preset::KgInsightsHeader, "\n🔍 **Ideas del grafo de conocimientos:**\n"),
    (Preset::KgStandardPrefix, "> **Trabajando desde estándar**: "),
    (Preset::KgFallback, "\n⚠️ Usando ideas del grafo de conocimientos de respaldo.\n"),
    (Preset::ProjectTopicsHeader, "\n📚 **Temas del proyecto:**\n"),
    (Preset::CrossSubjectsHeader, "\n🔗 **Conexiones entre materias:**\n"),
    (Preset::RealWorldHeader, "\n🌎 **Aplicaciones en el mundo real:**\n"),
    (Preset::ResourcesHeader, "\n📘 **Recursos curriculares:**\n"),
    (Preset::ImplementationHeader, "\n💡 **Ideas de implementación:**\n"),
    (Preset::ConfidencePrefix, "\n✅ **Confianza de relevancia:** "),
    (Preset::CreatingOptionsHeader, "\n#### Creando ideas de proyectos…\n"),
    (Preset::ProjectOptionsHeader, "\n=== OPCIONES DE PROYECTO ===\n"),
    (Preset::FallbackOptions, "\n⚠️ No pude generar las opciones; aquí tienes un punto de partida:\n"),
    (Preset::OptionLabel, "Opción"),
    (Preset::RationaleLabel, "• Justificación"),
    (Preset::DrivingQuestionLabel, "• Pregunta impulsora"),
    (Preset::EndProductLabel, "• Producto final"),
    (Preset::KeySkillsLabel, "• Habilidades clave"),
    (Preset::LearningObjectivesLabel, "• Objetivos de aprendizaje"),
    (Preset::AssessmentSummaryLabel, "• Resumen de evaluación"),
    (Preset::ChoicePrompt, "Por favor elige una opción del 1 al {max}."),
    (Preset::InvalidChoice, "Por favor selecciona una opción entre 1 y {max}."),
    (Preset::FullDetailsHeader, "\n🔎 **Detalles completos de tu proyecto:**"),
    (Preset::ProjectReady, "\n🎉 Tu proyecto está listo."),
    (Preset::SelectionSaved, "Tu proyecto fue guardado (id: {id})."),
    (Preset::SaveFailed, "Tu proyecto está listo, pero no se pudo guardar en este momento."),
    (Preset::RefineApplying, "Aplicando tus cambios…"),
    (Preset::RefineNoChange, "No encontré nada que cambiar con esa solicitud."),
    (Preset::RefineSaved, "Guardado como nueva versión (id: {id})."),
    (Preset::RefineNotSaved, "Tus cambios están listos, pero no se pudo guardar la nueva versión."),
];

const FRENCH: &[(Preset, &str)] = &[
    (Preset::NeedMoreInfo, "J’ai besoin d’informations supplémentaires pour t’aider à créer ton projet."),
    (Preset::ProvideMissingSlots, "Peux-tu me fournir {slots} ?"),
    (Preset::AllInfoReceived, "Génial ! J’ai toutes les informations dont j’ai besoin."),
    (Preset::GetStandardsHeader, "\n#### Récupération des recommandations de normes…\n"),
    (Preset::RecommendedStandards, "\n🔖 **Normes recommandées :**\n"),
    (Preset::PrerequisitesPrefix, "\n📌 **Prérequis :** "),
    (Preset::CrossCurricularPrefix, "\n🔗 **Connexions interdisciplinaires :** "),
    (Preset::StandardsFallback, "\n⚠️ Utilisation de repères généraux pour ce niveau.\n"),
    (Preset::GetKgHeader, "\n#### Récupération des insights du graphe de connaissances…\n"),
    (Preset::KgInsightsHeader, "\n🔍 **Insights du graphe de connaissances :**\n"),
    (Preset::KgStandardPrefix, "\n> **Travail à partir de la norme**: "),
    (Preset::KgFallback, "\n⚠️ Utilisation des insights de secours du graphe de connaissances.\n"),
    (Preset::ProjectTopicsHeader, "\n📚 **Sujets du projet :**\n"),
    (Preset::CrossSubjectsHeader, "\n🔗 **Connexions entre disciplines :**\n"),
    (Preset::RealWorldHeader, "\n🌎 **Applications concrètes :**\n"),
    (Preset::ResourcesHeader, "\n📘 **Ressources pédagogiques :**\n"),
    (Preset::ImplementationHeader, "\n💡 **Idées de mise en œuvre :**\n"),
    (Preset::ConfidencePrefix, "\n✅ **Confiance de pertinence :** "),
    (Preset::CreatingOptionsHeader, "\n#### Création des options de projet…\n"),
    (Preset::ProjectOptionsHeader, "\n=== OPTIONS DE PROJET ===\n"),
    (Preset::FallbackOptions, "\n⚠️ Impossible de générer les options ; voici un point de départ :\n"),
    (Preset::OptionLabel, "Option"),
    (Preset::RationaleLabel, "• Justification"),
    (Preset::DrivingQuestionLabel, "• Question directrice"),
    (Preset::EndProductLabel, "• Produit final"),
    (Preset::KeySkillsLabel, "• Compétences clés"),
    (Preset::LearningObjectivesLabel, "• Objectifs d’apprentissage"),
    (Preset::AssessmentSummaryLabel, "• Résumé de l’évaluation"),
    (Preset::ChoicePrompt, "Veuillez choisir une option de 1 à {max}."),
    (Preset::InvalidChoice, "Veuillez sélectionner une option entre 1 et {max}."),
    (Preset::FullDetailsHeader, "\n🔎 **Détails complets du projet :**"),
    (Preset::ProjectReady, "🎉 Votre projet est prêt."),
    (Preset::SelectionSaved, "Votre projet a été enregistré (id : {id})."),
    (Preset::SaveFailed, "Votre projet est prêt, mais il n’a pas pu être enregistré pour le moment."),
    (Preset::RefineApplying, "Application de vos modifications…"),
    (Preset::RefineNoChange, "Je n’ai rien trouvé à modifier pour cette demande."),
    (Preset::RefineSaved, "Enregistré comme nouvelle version (id : {id})."),
    (Preset::RefineNotSaved, "Vos modifications sont prêtes, mais la nouvelle version n’a pas pu être enregistrée."),
];

type Table = HashMap<Preset, &'static str>;

static TABLES: Lazy<HashMap<Language, Table>> = Lazy::new(|| {
    [
        (Language::English, ENGLISH),
        (Language::Spanish, SPANISH),
        (Language::French, FRENCH),
    ]
    .into_iter()
    .map(|(language, rows)| (language, rows.iter().copied().collect()))
    .collect()
});

/// English text back to its preset, for exact-match translation.
static BY_ENGLISH_TEXT: Lazy<HashMap<&'static str, Preset>> =
    Lazy::new(|| ENGLISH.iter().map(|(preset, text)| (*text, *preset)).collect());

/// Localizer backed by compiled-in preset tables.
///
/// Free text that is not a known preset passes through untranslated.
#[derive(Debug, Clone, Copy, Default)]
pub struct PresetLocalizer;

impl PresetLocalizer {
    pub fn new() -> Self {
        Self
    }

    fn lookup(preset: Preset, language: Language) -> Option<&'static str> {
        TABLES.get(&language)?.get(&preset).copied()
    }
}

impl Localizer for PresetLocalizer {
    fn resolve(&self, preset: Preset, language: Language) -> String {
        Self::lookup(preset, language)
            .or_else(|| Self::lookup(preset, Language::English))
            .unwrap_or_default()
            .to_string()
    }

    fn translate(&self, text: &str, source: Language, target: Language) -> String {
        if source == target || text.trim().is_empty() {
            return text.to_string();
        }
        let preset = match source {
            Language::English => BY_ENGLISH_TEXT.get(text).copied(),
            _ => TABLES
                .get(&source)
                .and_then(|table| table.iter().find(|(_, t)| **t == text))
                .map(|(preset, _)| *preset),
        };
        match preset {
            Some(preset) => self.resolve(preset, target),
            None => text.to_string(),
        }
    }
}
