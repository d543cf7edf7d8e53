//! API difference detection
//!
//! The difference taxonomy (codes, severities, localized messages), the pair
//! dispatcher every check is written against, the checks themselves and the
//! engine that runs them.

pub mod annotation_checks;
pub mod categories;
pub mod class_checks;
pub mod codes;
pub mod dispatch;
pub mod engine;
pub mod field_checks;
pub mod generics_checks;
pub mod messages;
pub mod method_checks;
pub mod registry;
pub mod types;

pub use categories::CheckCategory;
pub use codes::Code;
pub use dispatch::{visit_pair, visit_single, ElementPairVisitor, Node};
pub use engine::{CheckConfig, CheckEngine, CheckReport};
pub use messages::{
    default_registry, DirectoryMessages, EmbeddedMessages, Locale, Message, MessageRegistry, MessageSource, Messages,
};
pub use types::{Attachment, CheckContext, CheckOutcome, CompatibilityType, Difference, DifferenceSeverity};
