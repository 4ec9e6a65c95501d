pub mod catalog;
pub mod domain;
pub mod export;
pub mod failure;
pub mod i18n;
pub mod ports;
pub mod prompt;
pub mod render;

pub use domain::{
    Cv1001Activity, Cv1001Outcomes, Cv1001Plan, Cv5512Activity, Cv5512Outcomes, Cv5512Plan,
    LessonPlan, LessonPlanInput, PlanBody, ReferenceFile, ReferenceKind, TeachingAids,
    TemplateKind,
};
pub use export::{layout_document, DocumentLayout};
pub use failure::{classify_service_failure, FailureKind};
pub use i18n::{Label, Locale};
pub use ports::{CredentialStore, DocumentWriter, GenerationService, PortError, PortResult};
pub use render::{render_state, RenderState};
