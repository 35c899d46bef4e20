// Routing decision over the classifier's action label

/// Substring keywords that send a request down the data analysis path.
/// Matching is plain substring search, so "target" matches "get"; that
/// imprecision is kept for compatibility with existing action labels.
pub const DATA_KEYWORDS: [&str; 8] = [
    "analyze", "data", "report", "count", "query", "calculate", "show", "get",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    DataAnalysis,
    Conversation,
}

pub fn route_for(action: &str) -> Route {
    let action = action.to_lowercase();
    if DATA_KEYWORDS.iter().any(|k| action.contains(k)) {
        Route::DataAnalysis
    } else {
        Route::Conversation
    }
}
