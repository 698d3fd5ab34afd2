//! Course run resource links that point at a Joanie product rather than an
//! LMS course.

use regex::Regex;

use crate::api::API_VERSION_PATH;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductLink {
    pub course_code: Option<String>,
    pub product_id: String,
}

/// Parse `{endpoint}/api/v1.0/[courses/{course_code}/]products/{product_id}/`.
///
/// Returns `None` for links served by another host or shaped differently.
pub fn extract_product(resource_link: &str, endpoint: &str) -> Option<ProductLink> {
    let pattern = format!(
        r"^{}/{}/(?:courses/(?<course_code>[^/?#]+)/)?products/(?<product_id>[^/?#]+)/?(?:[?#].*)?$",
        regex::escape(endpoint.trim_end_matches('/')),
        regex::escape(API_VERSION_PATH),
    );
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            tracing::warn!(endpoint, error = %e, "cannot build product link pattern");
            return None;
        }
    };

    let caps = re.captures(resource_link)?;
    Some(ProductLink {
        course_code: caps.name("course_code").map(|m| m.as_str().to_string()),
        product_id: caps.name("product_id")?.as_str().to_string(),
    })
}

/// `true` when the link designates a Joanie product.
pub fn is_product_link(resource_link: &str, endpoint: &str) -> bool {
    extract_product(resource_link, endpoint).is_some()
}
