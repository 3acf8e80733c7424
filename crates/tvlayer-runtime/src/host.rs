#![forbid(unsafe_code)]

//! Host page capabilities the engine needs beyond card discovery.

use tvlayer_nav::PageRoot;

/// Class marking the page as enhanced.
pub const ROOT_CLASS: &str = "tv-layer-active";

/// A page the engine can restyle.
pub trait HostPage: PageRoot {
    /// Add (`on = true`) or remove a class on the page body.
    fn set_body_class(&self, class: &str, on: bool);
}

#[cfg(feature = "test-helpers")]
impl HostPage for tvlayer_nav::testing::MockPage {
    fn set_body_class(&self, class: &str, on: bool) {
        tvlayer_nav::testing::MockPage::set_body_class(self, class, on);
    }
}
