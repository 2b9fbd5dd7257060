use crate::configuration::DatabaseSettings;
use crate::domain::{Book, Borrowing, BorrowingDetails, NewNotification, Notification};
use crate::models::{
    into_details, BookRow, BorrowingWithBookRow, NewBorrowingRow, NewNotificationRow,
    NotificationRow,
};
use crate::store::{LendingStore, LendingTx, StoreError};
use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use diesel::connection::{AnsiTransactionManager, TransactionManager};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::result::DatabaseErrorKind;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use uuid::Uuid;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

type PgPooledConnection = PooledConnection<ConnectionManager<PgConnection>>;

pub fn establish_connection_pool(settings: &DatabaseSettings) -> anyhow::Result<DbPool> {
    let manager =
        ConnectionManager::<PgConnection>::new(settings.connection_string().expose_secret());
    Pool::builder()
        .max_size(settings.max_connections)
        .build(manager)
        .context("Failed to create the Postgres connection pool.")
}

pub fn run_migrations(db_pool: &DbPool) -> anyhow::Result<()> {
    let mut conn = db_pool
        .get()
        .context("Failed to get a connection to run migrations.")?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow!("Failed to run migrations: {}", e))?;
    Ok(())
}

/// Postgres-backed store. Borrow and Return serialise on the book row via `FOR UPDATE`.
pub struct PgStore {
    db_pool: DbPool,
}

impl PgStore {
    pub fn new(db_pool: DbPool) -> Self {
        PgStore { db_pool }
    }
}

impl LendingStore for PgStore {
    fn begin(&self) -> Result<Box<dyn LendingTx + '_>, StoreError> {
        let mut conn = self.db_pool.get().map_err(StoreError::Pool)?;
        <AnsiTransactionManager as TransactionManager<PgConnection>>::begin_transaction(&mut *conn)?;
        Ok(Box::new(PgTx {
            conn,
            finished: false,
        }))
    }
}

struct PgTx {
    conn: PgPooledConnection,
    finished: bool,
}

impl Drop for PgTx {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) =
            <AnsiTransactionManager as TransactionManager<PgConnection>>::rollback_transaction(
                &mut *self.conn,
            )
        {
            tracing::error!(error.cause_chain = ?e, "Failed to roll back an abandoned transaction");
        }
    }
}

impl LendingTx for PgTx {
    fn active_subscription_end(
        &mut self,
        subscriber: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        use crate::schema::user_subscriptions::dsl::*;
        let latest = user_subscriptions
            .filter(user_id.eq(subscriber))
            .filter(is_active.eq(true))
            .filter(end_date.gt(now))
            .select(diesel::dsl::max(end_date))
            .get_result::<Option<DateTime<Utc>>>(&mut *self.conn)?;
        Ok(latest)
    }

    fn lock_book(&mut self, book_id: i32) -> Result<Option<Book>, StoreError> {
        use crate::schema::books;
        let row = books::table
            .find(book_id)
            .for_update()
            .first::<BookRow>(&mut *self.conn)
            .optional()?;
        Ok(row.map(Book::from))
    }

    fn set_copies_available(&mut self, book_id: i32, copies: i32) -> Result<(), StoreError> {
        use crate::schema::books;
        diesel::update(books::table.find(book_id))
            .set(books::copies_available.eq(copies))
            .execute(&mut *self.conn)?;
        Ok(())
    }

    fn borrowings_for_user(&mut self, user_id: Uuid) -> Result<Vec<BorrowingDetails>, StoreError> {
        use crate::schema::{books, borrowings};
        let rows = borrowings::table
            .inner_join(books::table)
            .filter(borrowings::user_id.eq(user_id))
            .order(borrowings::borrowed_at.desc())
            .select((borrowings::all_columns, books::title, books::author))
            .load::<BorrowingWithBookRow>(&mut *self.conn)?;
        Ok(rows.into_iter().map(into_details).collect())
    }

    fn find_borrowing(
        &mut self,
        borrowing_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<BorrowingDetails>, StoreError> {
        use crate::schema::{books, borrowings};
        let row = borrowings::table
            .inner_join(books::table)
            .filter(borrowings::id.eq(borrowing_id))
            .filter(borrowings::user_id.eq(user_id))
            .select((borrowings::all_columns, books::title, books::author))
            .first::<BorrowingWithBookRow>(&mut *self.conn)
            .optional()?;
        Ok(row.map(into_details))
    }

    fn insert_borrowing(&mut self, borrowing: &Borrowing) -> Result<(), StoreError> {
        use crate::schema::borrowings;
        match diesel::insert_into(borrowings::table)
            .values(NewBorrowingRow::from(borrowing))
            .execute(&mut *self.conn)
        {
            Ok(_) => Ok(()),
            Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info)) => {
                Err(StoreError::Conflict(info.message().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn record_return(&mut self, borrowing: &Borrowing) -> Result<bool, StoreError> {
        use crate::schema::borrowings::dsl::*;
        // A concurrent return holding the row lock makes this re-check `returned_at` after it commits.
        let updated = diesel::update(borrowings.find(borrowing.id).filter(returned_at.is_null()))
            .set((
                returned_at.eq(borrowing.returned_at),
                fine_amount.eq(borrowing.fine_amount),
                fine_paid.eq(borrowing.fine_paid),
            ))
            .execute(&mut *self.conn)?;
        Ok(updated > 0)
    }

    fn record_fine(&mut self, borrowing: &Borrowing) -> Result<bool, StoreError> {
        use crate::schema::borrowings::dsl::*;
        let updated = diesel::update(borrowings.find(borrowing.id).filter(returned_at.is_null()))
            .set((
                fine_amount.eq(borrowing.fine_amount),
                fine_paid.eq(borrowing.fine_paid),
            ))
            .execute(&mut *self.conn)?;
        Ok(updated > 0)
    }

    fn settle_fine(&mut self, borrowing_id: Uuid) -> Result<Option<Decimal>, StoreError> {
        use crate::schema::borrowings::dsl::*;
        let settled = diesel::update(
            borrowings
                .find(borrowing_id)
                .filter(fine_paid.eq(false))
                .filter(fine_amount.gt(Decimal::ZERO)),
        )
        .set(fine_paid.eq(true))
        .returning(fine_amount)
        .get_result::<Decimal>(&mut *self.conn)
        .optional()?;
        Ok(settled)
    }

    fn insert_notification(&mut self, notification: NewNotification) -> Result<bool, StoreError> {
        use crate::schema::notifications;
        // The partial unique index on (user_id, kind, borrowing_id) turns repeats into no-ops.
        let inserted = diesel::insert_into(notifications::table)
            .values(NewNotificationRow::new(Uuid::new_v4(), &notification))
            .on_conflict_do_nothing()
            .execute(&mut *self.conn)?;
        Ok(inserted > 0)
    }

    fn notifications_for_user(
        &mut self,
        owner: Uuid,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<Notification>, StoreError> {
        use crate::schema::notifications::dsl::*;
        let mut query = notifications.filter(user_id.eq(owner)).into_boxed();
        if unread_only {
            query = query.filter(read_at.is_null());
        }
        let rows = query
            .order(created_at.desc())
            .limit(limit)
            .load::<NotificationRow>(&mut *self.conn)?;
        rows.into_iter()
            .map(|row| Notification::try_from(row).map_err(StoreError::Corrupt))
            .collect()
    }

    fn count_notifications(&mut self, owner: Uuid, unread_only: bool) -> Result<i64, StoreError> {
        use crate::schema::notifications::dsl::*;
        let mut query = notifications.filter(user_id.eq(owner)).into_boxed();
        if unread_only {
            query = query.filter(read_at.is_null());
        }
        Ok(query.count().get_result(&mut *self.conn)?)
    }

    fn mark_notification_read(
        &mut self,
        owner: Uuid,
        notification_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        use crate::schema::notifications::dsl::*;
        let current = notifications
            .filter(id.eq(notification_id))
            .filter(user_id.eq(owner))
            .select(read_at)
            .first::<Option<DateTime<Utc>>>(&mut *self.conn)
            .optional()?;
        match current {
            None => Ok(false),
            Some(Some(_)) => Ok(true),
            Some(None) => {
                diesel::update(notifications.find(notification_id))
                    .set(read_at.eq(Some(at)))
                    .execute(&mut *self.conn)?;
                Ok(true)
            }
        }
    }

    fn mark_all_notifications_read(
        &mut self,
        owner: Uuid,
        at: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        use crate::schema::notifications::dsl::*;
        let updated = diesel::update(
            notifications
                .filter(user_id.eq(owner))
                .filter(read_at.is_null()),
        )
        .set(read_at.eq(Some(at)))
        .execute(&mut *self.conn)?;
        Ok(updated)
    }

    fn commit(mut self: Box<Self>) -> Result<(), StoreError> {
        // Marked first: a failed COMMIT has already ended the transaction on the server.
        self.finished = true;
        <AnsiTransactionManager as TransactionManager<PgConnection>>::commit_transaction(
            &mut *self.conn,
        )?;
        Ok(())
    }
}
