pub mod formatter;
pub mod publisher;
pub mod section;

pub use formatter::{FormatterPhase, SectionFormatter};
pub use publisher::{Preview, PreviewPublisher};
pub use section::{FormattedSection, Section, SectionEdit};
