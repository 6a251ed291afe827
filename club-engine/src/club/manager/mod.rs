//! ClubManager - public entry point of the engine
//!
//! # Operation Flow
//!
//! ```text
//! operation(args)
//!     ├─ 1. Begin write transaction (redb: one writer at a time)
//!     ├─ 2. Create ClubContext (txn + clock + time zone)
//!     ├─ 3. Run domain logic (admission / lifecycle / billing / ...)
//!     ├─ 4. Commit (any error before this drops the txn, nothing written)
//!     └─ 5. Broadcast ClubEvent(s)
//! ```
//!
//! Each operation has an `*_at(now)` variant taking the clock explicitly.

use super::{ClubContext, ClubError, ClubEvent, ClubResult};
use crate::billing::{DuesRunReport, invoices};
use crate::core::config::{Config, sanitize_meter_tolerance};
use crate::db::{ClubStorage, StorageError};
use crate::flights::{self, CheckOutResult};
use crate::maintenance::{evaluate_aircraft, records};
use crate::policy::{EffectivePolicy, PolicyDefaults, resolve_policy};
use crate::reservations;
use crate::services::FuelPriceProvider;
use crate::utils::time::local_date;
use crate::admin;
use chrono_tz::Tz;
use shared::models::{
    Aircraft, AircraftCreate, AircraftStatus, AircraftUpdate, AuditEntry, CheckInRequest,
    CheckOutRequest, ClubSettings, FleetMaintenanceSummary, FlightLog, Invoice, MaintenanceLog,
    MaintenanceLogCreate, MaintenanceSchedule, MaintenanceScheduleCreate, MaintenanceStatus,
    Member, MemberCreate, MemberUpdate, MembershipTier, MembershipTierCreate, Reservation,
    ReservationRequest, SquawkState,
};
use shared::util::now_millis;
use std::path::Path;
use tokio::sync::broadcast;

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 4096;

/// ClubManager
///
/// Shareable across threads (`Arc<ClubManager>`); redb serializes writers.
/// The `epoch` is regenerated on every start so subscribers can detect a
/// restart and reload.
pub struct ClubManager {
    storage: ClubStorage,
    event_tx: broadcast::Sender<ClubEvent>,
    epoch: String,
    /// 俱乐部时区
    tz: Tz,
    defaults: PolicyDefaults,
    /// Allowed backwards slack on check-in meter readings (hours)
    meter_tolerance: f64,
}

impl std::fmt::Debug for ClubManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClubManager")
            .field("storage", &"<ClubStorage>")
            .field("event_tx", &"<broadcast::Sender>")
            .field("epoch", &self.epoch)
            .field("tz", &self.tz)
            .finish()
    }
}

impl ClubManager {
    /// Open the database named in the config
    pub fn new(config: &Config) -> ClubResult<Self> {
        Self::open(&config.database_path, config)
    }

    pub fn open(db_path: impl AsRef<Path>, config: &Config) -> ClubResult<Self> {
        let storage = ClubStorage::open(db_path)?;
        Ok(Self::with_storage(
            storage,
            config.timezone,
            config.policy_defaults,
            config.meter_tolerance,
        ))
    }

    pub fn with_storage(
        storage: ClubStorage,
        tz: Tz,
        defaults: PolicyDefaults,
        meter_tolerance: f64,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let epoch = uuid::Uuid::new_v4().to_string();
        tracing::info!(epoch = %epoch, tz = %tz, "ClubManager started with new epoch");
        Self {
            storage,
            event_tx,
            epoch,
            tz,
            defaults,
            meter_tolerance: sanitize_meter_tolerance(meter_tolerance),
        }
    }

    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn storage(&self) -> &ClubStorage {
        &self.storage
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClubEvent> {
        self.event_tx.subscribe()
    }

    /// Run `f` inside one write transaction and commit on success
    fn transact<T>(&self, now: i64, f: impl FnOnce(&ClubContext<'_>) -> ClubResult<T>) -> ClubResult<T> {
        let txn = self.storage.begin_write()?;
        let out = {
            let ctx = ClubContext::new(&txn, &self.storage, self.tz, now);
            f(&ctx)?
        };
        txn.commit().map_err(StorageError::from)?;
        Ok(out)
    }

    fn publish(&self, events: impl IntoIterator<Item = ClubEvent>) {
        for event in events {
            if self.event_tx.send(event).is_err() {
                tracing::debug!("Event broadcast skipped: no active receivers");
                break;
            }
        }
    }

    // ========== Reservations ==========

    pub fn request_reservation(&self, req: &ReservationRequest) -> ClubResult<Reservation> {
        self.request_reservation_at(req, now_millis())
    }

    pub fn request_reservation_at(&self, req: &ReservationRequest, now: i64) -> ClubResult<Reservation> {
        let result = self.transact(now, |ctx| {
            reservations::request_reservation(ctx, &self.defaults, req)
        });
        match result {
            Ok(reservation) => {
                self.publish([ClubEvent::ReservationConfirmed {
                    reservation: reservation.clone(),
                }]);
                Ok(reservation)
            }
            Err(e) => {
                tracing::info!(
                    member_id = req.member_id,
                    aircraft_id = req.aircraft_id,
                    error = %e,
                    "Reservation rejected"
                );
                Err(e)
            }
        }
    }

    pub fn cancel_reservation(&self, reservation_id: i64) -> ClubResult<Reservation> {
        self.cancel_reservation_at(reservation_id, now_millis())
    }

    pub fn cancel_reservation_at(&self, reservation_id: i64, now: i64) -> ClubResult<Reservation> {
        let (reservation, late) = self.transact(now, |ctx| flights::cancel(ctx, reservation_id))?;
        self.publish([ClubEvent::ReservationCancelled {
            reservation_id: reservation.id,
            member_id: reservation.member_id,
            late,
        }]);
        Ok(reservation)
    }

    /// Effective booking policy for a member
    pub fn effective_policy(&self, member_id: i64) -> ClubResult<EffectivePolicy> {
        let member: Member = self
            .storage
            .read(member_id)?
            .ok_or_else(|| ClubError::not_found("Member", member_id))?;
        let tier = match member.tier_id {
            Some(tier_id) => self.storage.read::<MembershipTier>(tier_id)?,
            None => None,
        };
        let settings = self.storage.read_settings()?;
        resolve_policy(tier.as_ref(), settings.as_ref(), &self.defaults)
    }

    // ========== Flight lifecycle ==========

    pub fn check_in(&self, req: &CheckInRequest) -> ClubResult<FlightLog> {
        self.check_in_at(req, now_millis())
    }

    pub fn check_in_at(&self, req: &CheckInRequest, now: i64) -> ClubResult<FlightLog> {
        let log = self.transact(now, |ctx| flights::check_in(ctx, self.meter_tolerance, req))?;
        self.publish([ClubEvent::FlightCheckedIn {
            reservation_id: log.reservation_id,
            aircraft_id: log.aircraft_id,
            flight_log_id: log.id,
        }]);
        Ok(log)
    }

    pub fn check_out(&self, req: &CheckOutRequest) -> ClubResult<CheckOutResult> {
        self.check_out_at(req, now_millis())
    }

    pub fn check_out_at(&self, req: &CheckOutRequest, now: i64) -> ClubResult<CheckOutResult> {
        let result = self.transact(now, |ctx| flights::check_out(ctx, &self.defaults, req))?;

        let mut events = vec![
            ClubEvent::FlightCheckedOut {
                reservation_id: result.reservation.id,
                aircraft_id: result.flight_log.aircraft_id,
                invoice_id: result.invoice.id,
                net_amount: result.charge.net_amount,
            },
            ClubEvent::InvoiceIssued {
                invoice_id: result.invoice.id,
                member_id: result.invoice.member_id,
                amount: result.invoice.amount,
            },
        ];
        if result.flight_log.squawk == SquawkState::Open {
            events.push(ClubEvent::SquawkOpened {
                flight_log_id: result.flight_log.id,
                aircraft_id: result.flight_log.aircraft_id,
            });
        }
        self.publish(events);
        Ok(result)
    }

    pub fn get_flight_log(&self, flight_log_id: i64) -> ClubResult<Option<FlightLog>> {
        Ok(self.storage.read(flight_log_id)?)
    }

    // ========== Billing ==========

    pub fn generate_monthly_invoices(&self) -> ClubResult<DuesRunReport> {
        self.generate_monthly_invoices_at(now_millis())
    }

    pub fn generate_monthly_invoices_at(&self, now: i64) -> ClubResult<DuesRunReport> {
        let report = self.transact(now, invoices::generate_monthly_invoices)?;
        self.publish(report.created.iter().map(|invoice| ClubEvent::InvoiceIssued {
            invoice_id: invoice.id,
            member_id: invoice.member_id,
            amount: invoice.amount,
        }));
        Ok(report)
    }

    /// Payment gateway "invoice paid" event; safe to deliver more than once
    pub fn mark_invoice_paid(&self, invoice_id: i64) -> ClubResult<Invoice> {
        self.mark_invoice_paid_at(invoice_id, now_millis())
    }

    pub fn mark_invoice_paid_at(&self, invoice_id: i64, now: i64) -> ClubResult<Invoice> {
        let (invoice, changed) =
            self.transact(now, |ctx| invoices::mark_invoice_paid(ctx, invoice_id))?;
        if changed {
            self.publish([ClubEvent::InvoicePaid {
                invoice_id: invoice.id,
                member_id: invoice.member_id,
            }]);
        }
        Ok(invoice)
    }

    pub fn send_invoice(&self, invoice_id: i64) -> ClubResult<Invoice> {
        self.transact(now_millis(), |ctx| invoices::send_invoice(ctx, invoice_id))
    }

    pub fn void_invoice(&self, invoice_id: i64) -> ClubResult<Invoice> {
        self.transact(now_millis(), |ctx| invoices::void_invoice(ctx, invoice_id))
    }

    pub fn get_invoice(&self, invoice_id: i64) -> ClubResult<Option<Invoice>> {
        Ok(self.storage.read(invoice_id)?)
    }

    pub fn member_invoices(&self, member_id: i64) -> ClubResult<Vec<Invoice>> {
        Ok(self.storage.read_member_invoices(member_id)?)
    }

    // ========== Maintenance ==========

    pub fn get_maintenance_status(&self, aircraft_id: i64) -> ClubResult<Vec<MaintenanceStatus>> {
        self.maintenance_status_at(aircraft_id, now_millis())
    }

    pub fn maintenance_status_at(&self, aircraft_id: i64, now: i64) -> ClubResult<Vec<MaintenanceStatus>> {
        let aircraft: Aircraft = self
            .storage
            .read(aircraft_id)?
            .ok_or_else(|| ClubError::not_found("Aircraft", aircraft_id))?;
        let schedules = self.storage.read_schedules_for_aircraft(aircraft_id)?;
        Ok(evaluate_aircraft(&aircraft, &schedules, local_date(now, self.tz)).items)
    }

    /// Worst status per aircraft, whole fleet
    pub fn fleet_maintenance_overview(&self) -> ClubResult<Vec<FleetMaintenanceSummary>> {
        self.fleet_maintenance_overview_at(now_millis())
    }

    pub fn fleet_maintenance_overview_at(&self, now: i64) -> ClubResult<Vec<FleetMaintenanceSummary>> {
        let today = local_date(now, self.tz);
        let fleet: Vec<Aircraft> = self.storage.read_all()?;
        fleet
            .iter()
            .map(|aircraft| -> ClubResult<FleetMaintenanceSummary> {
                let schedules = self.storage.read_schedules_for_aircraft(aircraft.id)?;
                Ok(evaluate_aircraft(aircraft, &schedules, today))
            })
            .collect()
    }

    pub fn create_schedule(&self, data: MaintenanceScheduleCreate) -> ClubResult<MaintenanceSchedule> {
        self.transact(now_millis(), |ctx| records::create_schedule(ctx, data))
    }

    pub fn delete_schedule(&self, schedule_id: i64) -> ClubResult<()> {
        self.transact(now_millis(), |ctx| records::delete_schedule(ctx, schedule_id))
    }

    pub fn record_maintenance(&self, data: MaintenanceLogCreate) -> ClubResult<MaintenanceLog> {
        self.transact(now_millis(), |ctx| records::record_maintenance(ctx, data))
    }

    pub fn maintenance_logs(&self, aircraft_id: i64) -> ClubResult<Vec<MaintenanceLog>> {
        Ok(self.storage.read_maintenance_logs(aircraft_id)?)
    }

    pub fn resolve_squawk(
        &self,
        flight_log_id: i64,
        resolution: &str,
        performed_by: &str,
    ) -> ClubResult<MaintenanceLog> {
        self.resolve_squawk_at(flight_log_id, resolution, performed_by, now_millis())
    }

    pub fn resolve_squawk_at(
        &self,
        flight_log_id: i64,
        resolution: &str,
        performed_by: &str,
        now: i64,
    ) -> ClubResult<MaintenanceLog> {
        let log = self.transact(now, |ctx| {
            records::resolve_squawk(ctx, flight_log_id, resolution, performed_by)
        })?;
        self.publish([ClubEvent::SquawkResolved {
            flight_log_id,
            maintenance_log_id: log.id,
        }]);
        Ok(log)
    }

    pub fn open_squawks(&self, aircraft_id: i64) -> ClubResult<Vec<FlightLog>> {
        let logs = self.storage.read_flight_logs_for_aircraft(aircraft_id)?;
        Ok(logs
            .into_iter()
            .filter(|log| log.squawk == SquawkState::Open)
            .collect())
    }

    pub fn set_aircraft_status(&self, aircraft_id: i64, status: AircraftStatus) -> ClubResult<Aircraft> {
        let aircraft = self.transact(now_millis(), |ctx| {
            records::set_aircraft_status(ctx, aircraft_id, status)
        })?;
        self.publish([ClubEvent::AircraftStatusChanged {
            aircraft_id,
            status: aircraft.status,
        }]);
        Ok(aircraft)
    }

    // ========== Administration ==========

    pub fn create_member(&self, data: MemberCreate) -> ClubResult<Member> {
        self.transact(now_millis(), |ctx| admin::create_member(ctx, data))
    }

    pub fn update_member(&self, member_id: i64, data: MemberUpdate) -> ClubResult<Member> {
        self.transact(now_millis(), |ctx| admin::update_member(ctx, member_id, data))
    }

    pub fn get_member(&self, member_id: i64) -> ClubResult<Option<Member>> {
        Ok(self.storage.read(member_id)?)
    }

    pub fn list_members(&self) -> ClubResult<Vec<Member>> {
        Ok(self.storage.read_all()?)
    }

    pub fn create_tier(&self, data: MembershipTierCreate) -> ClubResult<MembershipTier> {
        self.transact(now_millis(), |ctx| admin::create_tier(ctx, data))
    }

    pub fn update_tier(&self, tier_id: i64, data: MembershipTierCreate) -> ClubResult<MembershipTier> {
        self.transact(now_millis(), |ctx| admin::update_tier(ctx, tier_id, data))
    }

    pub fn delete_tier(&self, tier_id: i64) -> ClubResult<()> {
        self.transact(now_millis(), |ctx| admin::delete_tier(ctx, tier_id))
    }

    pub fn list_tiers(&self) -> ClubResult<Vec<MembershipTier>> {
        Ok(self.storage.read_all()?)
    }

    pub fn create_aircraft(&self, data: AircraftCreate) -> ClubResult<Aircraft> {
        self.transact(now_millis(), |ctx| admin::create_aircraft(ctx, data))
    }

    pub fn update_aircraft(&self, aircraft_id: i64, data: AircraftUpdate) -> ClubResult<Aircraft> {
        self.transact(now_millis(), |ctx| admin::update_aircraft(ctx, aircraft_id, data))
    }

    pub fn get_aircraft(&self, aircraft_id: i64) -> ClubResult<Option<Aircraft>> {
        Ok(self.storage.read(aircraft_id)?)
    }

    pub fn list_aircraft(&self) -> ClubResult<Vec<Aircraft>> {
        Ok(self.storage.read_all()?)
    }

    pub fn get_settings(&self) -> ClubResult<Option<ClubSettings>> {
        Ok(self.storage.read_settings()?)
    }

    pub fn upsert_settings(&self, settings: ClubSettings) -> ClubResult<ClubSettings> {
        self.transact(now_millis(), |ctx| admin::upsert_settings(ctx, settings))
    }

    // ========== Queries ==========

    pub fn get_reservation(&self, reservation_id: i64) -> ClubResult<Option<Reservation>> {
        Ok(self.storage.read(reservation_id)?)
    }

    pub fn member_reservations(&self, member_id: i64) -> ClubResult<Vec<Reservation>> {
        Ok(self.storage.read_member_reservations(member_id)?)
    }

    pub fn aircraft_reservations(&self, aircraft_id: i64) -> ClubResult<Vec<Reservation>> {
        Ok(self.storage.read_aircraft_reservations(aircraft_id)?)
    }

    pub fn audit_log(&self) -> ClubResult<Vec<AuditEntry>> {
        let mut entries: Vec<AuditEntry> = self.storage.read_all()?;
        entries.sort_by_key(|e| e.timestamp);
        Ok(entries)
    }

    // ========== Fuel prices ==========

    /// Best effort: provider failures are logged and swallowed.
    ///
    /// The provider is awaited before the write transaction opens.
    /// Returns whether settings were updated.
    pub async fn refresh_fuel_prices(&self, provider: &dyn FuelPriceProvider) -> bool {
        let home_airport = match self.storage.read_settings() {
            Ok(Some(settings)) if !settings.home_airport.is_empty() => settings.home_airport,
            Ok(_) => {
                tracing::debug!("No home airport configured, skipping fuel price refresh");
                return false;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read club settings for fuel price refresh");
                return false;
            }
        };

        let prices = match provider.fetch_prices(&home_airport).await {
            Ok(prices) => prices,
            Err(e) => {
                tracing::warn!(airport = %home_airport, error = %e, "Fuel price refresh failed");
                return false;
            }
        };

        let now = now_millis();
        let result = self.transact(now, |ctx| {
            let mut settings = ctx.settings()?.unwrap_or_default();
            if let Some(p) = prices.price_100ll {
                settings.fuel_price_100ll = Some(p);
            }
            if let Some(p) = prices.price_jet_a {
                settings.fuel_price_jet_a = Some(p);
            }
            if let Some(p) = prices.price_ul94 {
                settings.fuel_price_ul94 = Some(p);
            }
            settings.fuel_prices_updated_at = Some(ctx.now);
            ctx.storage.put_settings(ctx.txn, &settings)?;
            Ok(())
        });

        match result {
            Ok(()) => {
                tracing::info!(
                    airport = %home_airport,
                    price_100ll = ?prices.price_100ll,
                    price_jet_a = ?prices.price_jet_a,
                    price_ul94 = ?prices.price_ul94,
                    "Fuel prices refreshed"
                );
                self.publish([ClubEvent::FuelPricesUpdated { home_airport }]);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to store refreshed fuel prices");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests;
