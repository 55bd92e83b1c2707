#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub id: &'static str,
    pub label: &'static str,
}

/// Label used when an event carries no category id at all.
pub const UNKNOWN_LABEL: &str = "Unknown";

pub const CATEGORIES: &[Category] = &[
    Category {
        id: "interruption",
        label: "Interruption",
    },
    Category {
        id: "impulsive_email",
        label: "Impulsive email",
    },
    Category {
        id: "microtask_interruption",
        label: "Unplanned microtasks",
    },
    Category {
        id: "unexpected_meeting",
        label: "Unexpected meeting",
    },
    Category {
        id: "long_meeting",
        label: "Overrunning meeting",
    },
];

/// Resolves a category id to its display label. Unknown ids are returned
/// verbatim so stored events never fail to render.
pub fn label_for(category_id: &str) -> &str {
    CATEGORIES
        .iter()
        .find(|category| category.id == category_id)
        .map(|category| category.label)
        .unwrap_or(category_id)
}

pub fn is_known(category_id: &str) -> bool {
    CATEGORIES.iter().any(|category| category.id == category_id)
}
