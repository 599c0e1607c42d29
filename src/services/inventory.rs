//! Inventory ledger: the source of truth for committed and held room-nights.
//!
//! Reservation is atomic over the whole date range. The per-night ledger rows
//! are created lazily, then locked `FOR UPDATE` in date order so concurrent
//! reservations for overlapping ranges serialize without deadlocking. An
//! unexpired active hold counts toward booked inventory; expiry is how
//! abandoned bookings give their rooms back.

use std::collections::{BTreeMap, HashMap};

use chrono::{Days, Duration, NaiveDate, Utc};
use sea_orm::sea_query::{Expr, LockType, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    entity::{
        inventory_holds::{self, Column as HoldCol, Entity as InventoryHolds},
        room_inventory::{self, Column as InvCol, Entity as RoomInventory},
        room_types,
    },
    error::{AppError, AppResult},
    pricing::validate_date_range,
    status::HoldStatus,
};

/// Reserve `rooms_count` rooms on every night in `[check_in, check_out)`, or
/// fail entirely. Returns the hold row; its id is the hold token.
pub async fn reserve(
    txn: &DatabaseTransaction,
    room_type: &room_types::Model,
    check_in: NaiveDate,
    check_out: NaiveDate,
    rooms_count: i32,
    ttl_minutes: i64,
) -> AppResult<inventory_holds::Model> {
    validate_date_range(check_in, check_out)?;
    if rooms_count <= 0 {
        return Err(AppError::BadRequest("rooms_count must be positive".into()));
    }

    ensure_ledger_rows(txn, room_type.id, check_in, check_out).await?;
    let rows = lock_range(txn, room_type.id, check_in, check_out).await?;

    let held = held_by_date(txn, room_type.id, check_in, check_out, None).await?;
    for row in &rows {
        let held_here = held.get(&row.date).copied().unwrap_or(0);
        if row.rooms_booked + held_here + rooms_count > room_type.total_rooms {
            return Err(AppError::InsufficientInventory {
                room_type_id: room_type.id,
                date: row.date,
            });
        }
    }

    let now = Utc::now();
    let hold = inventory_holds::ActiveModel {
        id: Set(Uuid::new_v4()),
        room_type_id: Set(room_type.id),
        check_in: Set(check_in),
        check_out: Set(check_out),
        rooms_count: Set(rooms_count),
        status: Set(HoldStatus::Active.as_str().to_string()),
        expires_at: Set((now + Duration::minutes(ttl_minutes)).into()),
        created_at: Set(now.into()),
    }
    .insert(txn)
    .await?;

    tracing::debug!(hold_id = %hold.id, room_type_id = %room_type.id, rooms_count, "inventory reserved");
    Ok(hold)
}

/// Turn an active hold into committed room-nights. Idempotent for a hold that
/// is already committed. A hold that outlived its expiry must pass the
/// capacity check again, since availability stopped counting it.
pub async fn commit(
    txn: &DatabaseTransaction,
    room_type: &room_types::Model,
    hold_id: Uuid,
) -> AppResult<()> {
    let hold = lock_hold(txn, hold_id).await?;
    match HoldStatus::parse(&hold.status) {
        Some(HoldStatus::Committed) => return Ok(()),
        Some(HoldStatus::Active) => {}
        _ => {
            return Err(AppError::BadRequest(
                "hold has been released and cannot be committed".into(),
            ));
        }
    }

    let rows = lock_range(txn, hold.room_type_id, hold.check_in, hold.check_out).await?;

    if hold.expires_at < Utc::now() {
        let held =
            held_by_date(txn, hold.room_type_id, hold.check_in, hold.check_out, Some(hold.id))
                .await?;
        for row in &rows {
            let held_here = held.get(&row.date).copied().unwrap_or(0);
            if row.rooms_booked + held_here + hold.rooms_count > room_type.total_rooms {
                return Err(AppError::InsufficientInventory {
                    room_type_id: hold.room_type_id,
                    date: row.date,
                });
            }
        }
    }

    adjust_range(
        txn,
        hold.room_type_id,
        hold.check_in,
        hold.check_out,
        hold.rooms_count,
    )
    .await?;
    set_hold_status(txn, hold, HoldStatus::Committed).await?;
    Ok(())
}

/// Release a hold. Idempotent: releasing twice is a no-op; a committed hold
/// gives its room-nights back to the ledger.
pub async fn release(txn: &DatabaseTransaction, hold_id: Uuid) -> AppResult<()> {
    let hold = lock_hold(txn, hold_id).await?;
    match HoldStatus::parse(&hold.status) {
        Some(HoldStatus::Released) => Ok(()),
        Some(HoldStatus::Active) => {
            set_hold_status(txn, hold, HoldStatus::Released).await?;
            Ok(())
        }
        Some(HoldStatus::Committed) => {
            lock_range(txn, hold.room_type_id, hold.check_in, hold.check_out).await?;
            adjust_range(
                txn,
                hold.room_type_id,
                hold.check_in,
                hold.check_out,
                -hold.rooms_count,
            )
            .await?;
            set_hold_status(txn, hold, HoldStatus::Released).await?;
            Ok(())
        }
        None => Err(AppError::BadRequest(format!(
            "unknown hold status '{}'",
            hold.status
        ))),
    }
}

/// Booked rooms per night over `[from, to)`: committed ledger rows plus
/// unexpired active holds, swept over the range. Missing dates mean zero.
pub async fn booked_by_date<C: ConnectionTrait>(
    conn: &C,
    room_type_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
) -> AppResult<BTreeMap<NaiveDate, i32>> {
    let rows = RoomInventory::find()
        .filter(InvCol::RoomTypeId.eq(room_type_id))
        .filter(InvCol::Date.gte(from))
        .filter(InvCol::Date.lt(to))
        .all(conn)
        .await?;

    let mut map: BTreeMap<NaiveDate, i32> = rows
        .into_iter()
        .map(|row| (row.date, row.rooms_booked))
        .collect();

    for (date, count) in held_by_date(conn, room_type_id, from, to, None).await? {
        *map.entry(date).or_insert(0) += count;
    }

    Ok(map)
}

/// Sweep unexpired active holds overlapping `[from, to)` into a per-date count.
/// `exclude` drops one hold from the count (used when re-checking that hold).
async fn held_by_date<C: ConnectionTrait>(
    conn: &C,
    room_type_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
    exclude: Option<Uuid>,
) -> AppResult<HashMap<NaiveDate, i32>> {
    let holds = InventoryHolds::find()
        .filter(HoldCol::RoomTypeId.eq(room_type_id))
        .filter(HoldCol::Status.eq(HoldStatus::Active.as_str()))
        .filter(HoldCol::ExpiresAt.gt(Utc::now()))
        .filter(HoldCol::CheckIn.lt(to))
        .filter(HoldCol::CheckOut.gt(from))
        .all(conn)
        .await?;

    let mut map = HashMap::new();
    for hold in holds {
        if Some(hold.id) == exclude {
            continue;
        }
        let start = hold.check_in.max(from);
        let end = hold.check_out.min(to);
        let mut date = start;
        while date < end {
            *map.entry(date).or_insert(0) += hold.rooms_count;
            date = date + Days::new(1);
        }
    }
    Ok(map)
}

/// Lazily create the per-night ledger rows so the range lock has rows to take.
async fn ensure_ledger_rows(
    txn: &DatabaseTransaction,
    room_type_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> AppResult<()> {
    let mut date = check_in;
    while date < check_out {
        let row = room_inventory::ActiveModel {
            room_type_id: Set(room_type_id),
            date: Set(date),
            rooms_booked: Set(0),
        };
        match RoomInventory::insert(row)
            .on_conflict(
                OnConflict::columns([InvCol::RoomTypeId, InvCol::Date])
                    .do_nothing()
                    .to_owned(),
            )
            .exec(txn)
            .await
        {
            Ok(_) => {}
            Err(DbErr::RecordNotInserted) => {}
            Err(err) => return Err(err.into()),
        }
        date = date + Days::new(1);
    }
    Ok(())
}

async fn lock_range(
    txn: &DatabaseTransaction,
    room_type_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> AppResult<Vec<room_inventory::Model>> {
    let rows = RoomInventory::find()
        .filter(InvCol::RoomTypeId.eq(room_type_id))
        .filter(InvCol::Date.gte(check_in))
        .filter(InvCol::Date.lt(check_out))
        .order_by_asc(InvCol::Date)
        .lock(LockType::Update)
        .all(txn)
        .await?;
    Ok(rows)
}

async fn lock_hold(
    txn: &DatabaseTransaction,
    hold_id: Uuid,
) -> AppResult<inventory_holds::Model> {
    InventoryHolds::find_by_id(hold_id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or(AppError::NotFound)
}

async fn adjust_range(
    txn: &DatabaseTransaction,
    room_type_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
    delta: i32,
) -> AppResult<()> {
    RoomInventory::update_many()
        .col_expr(
            InvCol::RoomsBooked,
            Expr::col(InvCol::RoomsBooked).add(delta),
        )
        .filter(InvCol::RoomTypeId.eq(room_type_id))
        .filter(InvCol::Date.gte(check_in))
        .filter(InvCol::Date.lt(check_out))
        .exec(txn)
        .await?;
    Ok(())
}

async fn set_hold_status(
    txn: &DatabaseTransaction,
    hold: inventory_holds::Model,
    status: HoldStatus,
) -> AppResult<()> {
    let mut active: inventory_holds::ActiveModel = hold.into();
    active.status = Set(status.as_str().to_string());
    active.update(txn).await?;
    Ok(())
}
