/// Next-step computation and step validation
pub mod navigation_service;

/// Submission progression
pub mod submission_service;
