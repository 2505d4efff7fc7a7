/// Error code registry for the outreach runner
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 2000-2999: Contact source errors
/// - 3000-3999: Sent-log errors
/// - 4000-4999: Enrichment errors
/// - 5000-5999: Generation errors
/// - 6000-6999: Mail transport errors
/// - 7000-7999: Validation errors
/// - 9000-9999: Other errors
#[allow(dead_code)]
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_INVALID_TOML: u16 = 1002;
    pub const CONFIG_INVALID_JSON: u16 = 1003;
    pub const CONFIG_MISSING_REQUIRED: u16 = 1004;
    pub const CONFIG_INVALID_VALUE: u16 = 1005;
    pub const CONFIG_ENV_FILE: u16 = 1006;
    pub const CONFIG_CREDENTIALS: u16 = 1007;

    // Contact source errors (2000-2999)
    pub const CONTACTS_GENERIC: u16 = 2000;
    pub const CONTACTS_NOT_FOUND: u16 = 2001;
    pub const CONTACTS_UNREADABLE: u16 = 2002;
    pub const CONTACTS_MISSING_EMAIL_COLUMN: u16 = 2003;
    pub const CONTACTS_NONE_LOADED: u16 = 2004;

    // Sent-log errors (3000-3999)
    pub const SENTLOG_GENERIC: u16 = 3000;
    pub const SENTLOG_IO_ERROR: u16 = 3001;
    pub const SENTLOG_PERMISSION_DENIED: u16 = 3002;
    pub const SENTLOG_NOT_FOUND: u16 = 3003;
    pub const SENTLOG_CORRUPTED: u16 = 3004;
    pub const SENTLOG_BAD_HEADER: u16 = 3005;

    // Enrichment errors (4000-4999)
    pub const ENRICH_GENERIC: u16 = 4000;
    pub const ENRICH_REQUEST_FAILED: u16 = 4001;

    // Generation errors (5000-5999)
    pub const GENERATION_GENERIC: u16 = 5000;
    pub const GENERATION_REQUEST_FAILED: u16 = 5001;
    pub const GENERATION_RATE_LIMITED: u16 = 5002;
    pub const GENERATION_UNAUTHORIZED: u16 = 5003;
    pub const GENERATION_EMPTY_OUTPUT: u16 = 5004;
    pub const GENERATION_UNPARSEABLE: u16 = 5005;
    pub const GENERATION_TEMPLATE: u16 = 5006;

    // Mail transport errors (6000-6999)
    pub const SEND_GENERIC: u16 = 6000;
    pub const SEND_REQUEST_FAILED: u16 = 6001;
    pub const SEND_REJECTED: u16 = 6002;
    pub const SEND_AUTH_EXPIRED: u16 = 6003;
    pub const SEND_TOKEN_REFRESH_FAILED: u16 = 6004;
    pub const SEND_NO_MESSAGE_ID: u16 = 6005;

    // Validation errors (7000-7999)
    pub const VALIDATION_INVALID_EMAIL: u16 = 7002;
    pub const VALIDATION_INVALID_DATE: u16 = 7003;
    pub const VALIDATION_INVALID_DATA: u16 = 7009;

    // Other errors (9000-9999)
    pub const OTHER_GENERIC: u16 = 9000;
    pub const OTHER_TIMEOUT: u16 = 9002;
    pub const OTHER_INTERRUPTED: u16 = 9003;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        // Configuration errors
        1000 => "Generic configuration error",
        1001 => "Configuration file not found",
        1002 => "Invalid TOML syntax in configuration",
        1003 => "Invalid JSON syntax in configuration",
        1004 => "Required configuration value is missing",
        1005 => "Invalid value in configuration",
        1006 => "Could not parse .env file",
        1007 => "Mail credentials are missing or invalid",

        // Contact source errors
        2000 => "Generic contact source error",
        2001 => "Contact file not found",
        2002 => "Contact file could not be read",
        2003 => "Contact file has no email column",
        2004 => "No contact file could be loaded",

        // Sent-log errors
        3000 => "Generic sent-log error",
        3001 => "Sent-log I/O error",
        3002 => "Sent-log permission denied",
        3003 => "Sent-log not found",
        3004 => "Sent-log data is corrupted",
        3005 => "Sent-log header does not match the expected columns",

        // Enrichment errors
        4000 => "Generic enrichment error",
        4001 => "Enrichment request failed",

        // Generation errors
        5000 => "Generic generation error",
        5001 => "Generation request failed",
        5002 => "Generation endpoint rate limited the request",
        5003 => "Generation endpoint rejected the API key",
        5004 => "Generation returned no content",
        5005 => "Generated text could not be parsed into subject and body",
        5006 => "Prompt template failed to render",

        // Mail transport errors
        6000 => "Generic mail transport error",
        6001 => "Mail send request failed",
        6002 => "Mail provider rejected the message",
        6003 => "Mail access token expired or revoked",
        6004 => "Mail access token refresh failed",
        6005 => "Mail provider returned no message id",

        // Validation errors
        7002 => "Invalid email address",
        7003 => "Invalid date",
        7009 => "Invalid data",

        // Other errors
        9000 => "Generic error",
        9002 => "Operation timed out",
        9003 => "Operation interrupted",

        _ => "Unknown error code",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_descriptions() {
        assert_eq!(
            describe_error_code(ErrorCode::CONFIG_MISSING_REQUIRED),
            "Required configuration value is missing"
        );
        assert_eq!(
            describe_error_code(ErrorCode::SEND_AUTH_EXPIRED),
            "Mail access token expired or revoked"
        );
        assert_eq!(describe_error_code(1234), "Unknown error code");
        assert_eq!(describe_error_code(9001), "Unknown error code");
    }

    #[test]
    fn test_error_code_ranges() {
        assert!((1000..2000).contains(&ErrorCode::CONFIG_CREDENTIALS));
        assert!((3000..4000).contains(&ErrorCode::SENTLOG_BAD_HEADER));
        assert!((5000..6000).contains(&ErrorCode::GENERATION_UNPARSEABLE));
        assert!((6000..7000).contains(&ErrorCode::SEND_NO_MESSAGE_ID));
    }
}
