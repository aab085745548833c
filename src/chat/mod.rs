pub mod classifier;
pub mod dispatcher;
pub mod intent;

pub use classifier::{GroqClassifier, IntentClassifier, KeywordClassifier};
pub use dispatcher::{ChatReply, Dispatcher};
pub use intent::{ChatEntities, Intent, IntentResult};
