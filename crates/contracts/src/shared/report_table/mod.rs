pub mod expansion;
pub mod format;
pub mod grade;
pub mod nodes;
pub mod resolver;
pub mod rules;
pub mod schema;
pub mod tree;

pub use expansion::*;
pub use grade::*;
pub use nodes::*;
pub use resolver::*;
pub use rules::*;
pub use schema::*;
pub use tree::*;
