use crate::domain::Book;
use diesel::Queryable;

#[derive(Queryable, Debug)]
pub struct BookRow {
    pub id: i32,
    pub title: String,
    pub author: Option<String>,
    pub copies_total: i32,
    pub copies_available: i32,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: row.id,
            title: row.title,
            author: row.author,
            copies_total: row.copies_total,
            copies_available: row.copies_available,
        }
    }
}
