mod channel_helpers;
mod comment_helpers;
mod like_helpers;
mod subscription_helpers;
mod user_helpers;
mod video_helpers;

pub use channel_helpers::*;
pub use comment_helpers::*;
pub use like_helpers::*;
pub use subscription_helpers::*;
pub use user_helpers::*;
pub use video_helpers::*;
