//! Sitemap parsing and title normalization
//!
//! Listing-based platforms publish their catalog as a sitemap in one of two
//! competing document shapes. This module reduces both shapes to one
//! intermediate form and cleans the percent-encoded titles they carry.

mod parser;
mod title;

pub use parser::{
    extract_experience_ref, parse_html_table, parse_sitemap, parse_xml_urlset, SitemapEntry,
};
pub use title::{clean_title, decode_title};
