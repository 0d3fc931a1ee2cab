//! 基础设施层（Infrastructure）
//!
//! 持有稀缺资源（Page），只暴露能力：
//! - `driver` - `PageDriver` 能力接口与 `Locator`
//! - `cdp_driver` - 基于 chromiumoxide 的实现
//! - `wait` - 有界等待

pub mod cdp_driver;
pub mod driver;
pub mod wait;

pub use cdp_driver::CdpDriver;
pub use driver::{Locator, PageDriver};
pub use wait::{wait_for, wait_present, wait_stale, wait_visible, WaitPolicy};
