use http::StatusCode;

/// Status codes the adapters branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum HttpStatusCode {
    Ok = 200,
    Created = 201,
    NoContent = 204,
    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    InternalServerError = 500,
    ServiceUnavailable = 503,
}

impl HttpStatusCode {
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Canonical reason phrase, e.g. `"Bad Request"`.
    pub fn reason_phrase(self) -> String {
        reason_phrase(StatusCode::from(self))
    }
}

impl From<HttpStatusCode> for StatusCode {
    fn from(code: HttpStatusCode) -> Self {
        // All variants are valid status codes.
        StatusCode::from_u16(code.as_u16()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl PartialEq<HttpStatusCode> for StatusCode {
    fn eq(&self, other: &HttpStatusCode) -> bool {
        self.as_u16() == other.as_u16()
    }
}

/// Reason phrase for any status, falling back to the numeric code for
/// non-standard statuses.
pub fn reason_phrase(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_u16().to_string())
}
