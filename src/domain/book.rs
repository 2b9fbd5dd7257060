#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: Option<String>,
    pub copies_total: i32,
    pub copies_available: i32,
}

impl Book {
    pub fn has_copy_on_shelf(&self) -> bool {
        self.copies_available > 0
    }

    /// Copies on the shelf after one comes back, never above the total.
    pub fn copies_after_return(&self) -> i32 {
        (self.copies_available + 1).min(self.copies_total)
    }
}
