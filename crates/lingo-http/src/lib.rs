#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]

mod helper;

pub mod cache_control;
pub mod csrf;
pub mod locale;

#[doc(no_inline)]
pub use self::{
    cache_control::CacheControl,
    csrf::{CsrfConfig, CsrfGuard, CsrfOutcome},
    locale::{LocaleAction, LocaleNegotiator, LocaleOutcome},
};
