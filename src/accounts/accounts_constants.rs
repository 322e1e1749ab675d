/// Account types accepted by the API
pub const ACCOUNT_TYPES: [&str; 5] = ["checking", "savings", "investment", "credit_card", "cash"];
