mod envelope;
pub use self::envelope::{total_pages, Envelope, IdSet, Page, SUCCESS_CODE};

mod resource;
pub use self::resource::{decode_id_list, encode_id_list, Resource, RunState, Trackable};

mod platform;
pub use self::platform::Platform;

mod cookie;
pub use self::cookie::{Cookie, CookieID, CookieStatus};

mod crawl_task;
pub use self::crawl_task::{CrawlTarget, CrawlTask, CrawlTaskID, TaskStatus};

mod feature;
pub use self::feature::{Feature, FeatureID, FEATURE_CATEGORIES};

mod sample_set;
pub use self::sample_set::{AcquireType, SampleSet, SampleSetID, SampleSetStatus};

mod style;
pub use self::style::{CalcStatus, StyleDefinition, StyleID};
