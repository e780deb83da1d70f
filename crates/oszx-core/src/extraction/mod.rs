//! Materialising archive members on disk.

pub mod long_path;
pub mod member;

pub use long_path::LongPathPolicy;
pub use member::MemberKind;
pub use member::extract_member;
