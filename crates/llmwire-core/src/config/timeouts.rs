//! Default timeout and endpoint values

use std::time::Duration;

/// Default values for the binary protocol
pub mod binary {
    use super::*;

    /// Default server host
    pub const HOST: &str = "localhost";

    /// Default server port
    pub const PORT: u16 = 8089;

    /// Connect timeout (3 seconds)
    pub const CONNECT_MS: u64 = 3000;

    /// Blocking-read timeout; also the cancellation poll interval (3 seconds)
    pub const READ_MS: u64 = 3000;

    /// Get connect timeout as Duration
    pub fn connect_timeout() -> Duration {
        Duration::from_millis(CONNECT_MS)
    }

    /// Get read timeout as Duration
    pub fn read_timeout() -> Duration {
        Duration::from_millis(READ_MS)
    }
}

/// Default values for the HTTP SSE protocol
pub mod http {
    /// Default server base URL
    pub const BASE_URL: &str = "http://localhost:7681";

    /// Chat-completion endpoint path
    pub const CHAT_PATH: &str = "/v1/chat/completions";

    /// Infill endpoint path
    pub const INFILL_PATH: &str = "/infill";

    /// Connect timeout (10 seconds)
    pub const CONNECT_MS: u64 = 10_000;
}

/// Default values for fill-in-middle handling
pub mod fim {
    /// Start-of-turn token id that some models emit instead of a stop flag
    pub const START_OF_TURN_TOKEN: i64 = 151644;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_defaults() {
        assert_eq!(binary::connect_timeout(), Duration::from_secs(3));
        assert_eq!(binary::read_timeout(), Duration::from_secs(3));
        assert_eq!(binary::PORT, 8089);
    }
}
