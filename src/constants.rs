pub mod cache {

    /// Cache key holding the unfiltered requirement listing.
    pub const ALL_REQUIREMENTS_KEY: &str = "allrequirements";

    pub const DEFAULT_TTL_SECONDS: u64 = 1800;
}

pub mod export {

    pub const SHEET_NAME: &str = "Requirements";

    pub const FILE_NAME: &str = "Requirements.xlsx";

    pub const CONTENT_TYPE: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
}

pub mod database {

    pub const DEFAULT_CONNECT_RETRIES: u32 = 5;

    pub const DEFAULT_CONNECT_RETRY_DELAY_SECONDS: u64 = 5;
}
