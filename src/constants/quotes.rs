/// slot key the whole quote list is stored under.
pub const QUOTES_STORAGE_KEY: &str = "quotes";

pub const EXPORT_FILE_NAME: &str = "quotes.json";

pub const REMOTE_QUOTES_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/posts";

/// category tag given to every quote fetched from the remote mirror.
pub const SERVER_CATEGORY: &str = "Server";

pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 30;

pub const QUOTES_PER_PAGE: usize = 10;

pub const DEFAULT_QUOTES: [(&str, &str); 3] = [
    (
        "The only way to do great work is to love what you do.",
        "Motivation",
    ),
    (
        "Life is what happens when you're busy making other plans.",
        "Life",
    ),
    ("The purpose of our lives is to be happy.", "Happiness"),
];
