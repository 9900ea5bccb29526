//! Confluence API response types.

mod attachment;
mod page;

pub use attachment::{Attachment, AttachmentExtensions, AttachmentLinks, AttachmentsResponse};
pub use page::{Ancestor, Body, History, Links, Page, PagesResponse, Representation, Version};
