mod common;
pub use self::common::{Query, QueryCommon};

mod filters;
pub use self::filters::{FilterValue, Filters};

mod list;
pub use self::list::ListQuery;
