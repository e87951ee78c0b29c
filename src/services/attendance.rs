//! Attendance capture and reconciliation against the store.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::calculation::{
    AttendanceCalculationResult, DailyAttendanceStats, LeaveOverlap, WeekendHolidayOverlap,
    classify_range, leave_overlap_days, reconcile, tally_daily_stats,
};
use crate::error::{PayrollError, PayrollResult};
use crate::models::{Attendance, AttendanceStatus, EntryType, LeaveStatus, Shift};
use crate::store::HrStore;

/// Manual changes to an existing attendance row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceCorrection {
    /// Replacement status.
    pub status: AttendanceStatus,
    /// Replacement clock-in time.
    pub clock_in: Option<NaiveTime>,
    /// Replacement clock-out time.
    pub clock_out: Option<NaiveTime>,
    /// Why the row was corrected.
    pub remarks: Option<String>,
}

/// Loads attendance, leave and holiday data and reconciles it into day counts.
pub struct AttendanceService<S> {
    store: Arc<S>,
    overlap: WeekendHolidayOverlap,
}

impl<S> Clone for AttendanceService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            overlap: self.overlap,
        }
    }
}

impl<S: HrStore> AttendanceService<S> {
    /// Creates a service over `store` using the given weekend/holiday policy.
    pub fn new(store: Arc<S>, overlap: WeekendHolidayOverlap) -> Self {
        Self { store, overlap }
    }

    async fn holiday_dates(&self, start: NaiveDate, end: NaiveDate) -> PayrollResult<Vec<NaiveDate>> {
        Ok(self
            .store
            .holidays_in_range(start, end)
            .await?
            .into_iter()
            .map(|h| h.date)
            .collect())
    }

    /// Reconciles one employee's attendance and approved leave over `[start, end]`.
    ///
    /// Leave whose type cannot be found counts as unpaid.
    pub async fn calculate(
        &self,
        employee_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> PayrollResult<AttendanceCalculationResult> {
        let holidays = self.holiday_dates(start, end).await?;
        let calendar = classify_range(start, end, &holidays, self.overlap)?;

        let attendance = self
            .store
            .attendance_in_range(employee_id, start, end)
            .await?;

        let mut overlaps = Vec::new();
        for leave in self.store.leaves_for_employee(employee_id).await? {
            if leave.status != LeaveStatus::Approved {
                continue;
            }
            let Some(days) = leave_overlap_days(&leave, start, end) else {
                continue;
            };
            let is_paid = self
                .store
                .get_leave_type(leave.leave_type_id)
                .await?
                .is_some_and(|t| t.is_paid_leave);
            overlaps.push(LeaveOverlap { days, is_paid });
        }

        let result = reconcile(&calendar, &attendance, &overlaps);

        if result.paid_leave_truncated > Decimal::ZERO {
            warn!(
                employee_id,
                paid_leave_days = %result.paid_leave_days,
                truncated = %result.paid_leave_truncated,
                "Fractional paid leave dropped from paid days"
            );
        }
        debug!(
            employee_id,
            %start,
            %end,
            working_days = result.working_days,
            paid_days = result.paid_days,
            "Attendance reconciled"
        );

        Ok(result)
    }

    /// Working days in `[start, end]`: calendar days minus weekends and holidays.
    pub async fn working_days(&self, start: NaiveDate, end: NaiveDate) -> PayrollResult<i64> {
        let holidays = self.holiday_dates(start, end).await?;
        Ok(classify_range(start, end, &holidays, self.overlap)?.working_days)
    }

    /// Paid days for one employee in `[start, end]`.
    pub async fn paid_days(
        &self,
        employee_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> PayrollResult<i64> {
        Ok(self.calculate(employee_id, start, end).await?.paid_days)
    }

    /// Reconciles a single day.
    pub async fn calculate_for_day(
        &self,
        employee_id: i64,
        today: NaiveDate,
    ) -> PayrollResult<AttendanceCalculationResult> {
        self.calculate(employee_id, today, today).await
    }

    /// One employee's attendance row for `today`, if recorded.
    pub async fn attendance_for_day(
        &self,
        employee_id: i64,
        today: NaiveDate,
    ) -> PayrollResult<Option<Attendance>> {
        self.store.attendance_for_day(employee_id, today).await
    }

    /// Every employee's attendance row for `today`.
    pub async fn attendance_on(&self, today: NaiveDate) -> PayrollResult<Vec<Attendance>> {
        self.store.attendance_on(today).await
    }

    /// Fleet-wide status tally for `today`.
    pub async fn daily_stats(&self, today: NaiveDate) -> PayrollResult<DailyAttendanceStats> {
        let rows = self.store.attendance_on(today).await?;
        Ok(tally_daily_stats(&rows))
    }

    async fn shift_for(&self, employee_id: i64) -> PayrollResult<Option<Shift>> {
        let employee = self
            .store
            .get_employee(employee_id)
            .await?
            .ok_or_else(|| PayrollError::not_found("employee", employee_id))?;
        match employee.shift_id {
            Some(shift_id) => self.store.get_shift(shift_id).await,
            None => Ok(None),
        }
    }

    /// Records a clock-in, creating the day's attendance row.
    ///
    /// With a shift, arriving after start plus grace is `Late` and the late
    /// minutes are counted from the shift start; otherwise the row is `Present`.
    pub async fn clock_in(
        &self,
        employee_id: i64,
        date: NaiveDate,
        time: NaiveTime,
        entry_type: EntryType,
    ) -> PayrollResult<Attendance> {
        let shift = self.shift_for(employee_id).await?;

        if self
            .store
            .attendance_for_day(employee_id, date)
            .await?
            .is_some()
        {
            return Err(PayrollError::conflict(format!(
                "Attendance already recorded for employee {} on {}",
                employee_id, date
            )));
        }

        let mut attendance = Attendance::with_status(employee_id, date, AttendanceStatus::Present);
        attendance.clock_in = Some(time);
        attendance.entry_type = entry_type;

        if let Some(shift) = &shift {
            if time > shift.latest_on_time_arrival() {
                attendance.status = AttendanceStatus::Late;
                attendance.late_minutes = Some((time - shift.start_time).num_minutes());
            }
        }

        let attendance = self.store.add_attendance(attendance).await?;
        info!(
            employee_id,
            %date,
            status = ?attendance.status,
            late_minutes = attendance.late_minutes,
            "Clock-in recorded"
        );
        Ok(attendance)
    }

    /// Records a clock-out on the day's row and derives hours.
    ///
    /// Working hours are the span from clock-in, to two decimal places. With
    /// a shift, leaving before its end records early-leaving minutes and
    /// hours beyond its standard hours are overtime.
    ///
    /// `date` is the clock-in day. On an overnight shift a clock-out time
    /// earlier than the clock-in is taken to be on the following day; on any
    /// other shift it is a `Validation` error.
    pub async fn clock_out(
        &self,
        employee_id: i64,
        date: NaiveDate,
        time: NaiveTime,
    ) -> PayrollResult<Attendance> {
        let shift = self.shift_for(employee_id).await?;

        let mut attendance = self
            .store
            .attendance_for_day(employee_id, date)
            .await?
            .ok_or_else(|| PayrollError::not_found("attendance", format!("{}/{}", employee_id, date)))?;

        if attendance.clock_out.is_some() {
            return Err(PayrollError::conflict(format!(
                "Employee {} already clocked out on {}",
                employee_id, date
            )));
        }

        attendance.clock_out = Some(time);
        apply_hours(&mut attendance, shift.as_ref())?;

        let attendance = self.store.update_attendance(attendance).await?;
        info!(
            employee_id,
            %date,
            working_hours = ?attendance.working_hours,
            overtime_hours = ?attendance.overtime_hours,
            "Clock-out recorded"
        );
        Ok(attendance)
    }

    /// Overwrites status, times and remarks of an existing row and re-derives
    /// its hours.
    pub async fn correct(
        &self,
        attendance_id: i64,
        correction: AttendanceCorrection,
    ) -> PayrollResult<Attendance> {
        let mut attendance = self
            .store
            .get_attendance(attendance_id)
            .await?
            .ok_or_else(|| PayrollError::not_found("attendance", attendance_id))?;
        let shift = self.shift_for(attendance.employee_id).await?;

        attendance.status = correction.status;
        attendance.clock_in = correction.clock_in;
        attendance.clock_out = correction.clock_out;
        attendance.remarks = correction.remarks;
        attendance.working_hours = None;
        attendance.overtime_hours = None;
        attendance.early_leaving_minutes = None;
        if attendance.status != AttendanceStatus::Late {
            attendance.late_minutes = None;
        }
        apply_hours(&mut attendance, shift.as_ref())?;

        info!(attendance_id, status = ?attendance.status, "Attendance corrected");
        self.store.update_attendance(attendance).await
    }

    /// Adds imported rows as they are, for example from a biometric device.
    ///
    /// Stops at the first row that conflicts with an existing one; rows
    /// before it stay stored.
    pub async fn import(&self, rows: Vec<Attendance>) -> PayrollResult<usize> {
        let mut imported = 0;
        for row in rows {
            self.store.add_attendance(row).await?;
            imported += 1;
        }
        info!(imported, "Attendance rows imported");
        Ok(imported)
    }
}

fn apply_hours(attendance: &mut Attendance, shift: Option<&Shift>) -> PayrollResult<()> {
    let (Some(clock_in), Some(clock_out)) = (attendance.clock_in, attendance.clock_out) else {
        return Ok(());
    };
    let overnight = shift.is_some_and(Shift::is_overnight);
    let mut span = clock_out - clock_in;
    if span < chrono::Duration::zero() {
        if !overnight {
            return Err(PayrollError::validation(
                "clock_out",
                format!("{} is before clock-in {}", clock_out, clock_in),
            ));
        }
        // Clock-out falls on the next calendar day.
        span += chrono::Duration::days(1);
    }

    let minutes = span.num_minutes();
    let working_hours = (Decimal::from(minutes) / Decimal::from(60)).round_dp(2);
    attendance.working_hours = Some(working_hours);

    if let Some(shift) = shift {
        let until_end = if overnight && clock_out >= shift.start_time {
            Some(shift.end_time - clock_out + chrono::Duration::days(1))
        } else if clock_out < shift.end_time {
            Some(shift.end_time - clock_out)
        } else {
            None
        };
        if let Some(until_end) = until_end {
            attendance.early_leaving_minutes = Some(until_end.num_minutes());
        }
        if working_hours > shift.working_hours {
            attendance.overtime_hours = Some(working_hours - shift.working_hours);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::{Employee, Holiday, HolidayType, Leave, LeaveType};
    use crate::store::{AttendanceStore, EmployeeStore, HolidayStore, InMemoryStore, LeaveStore, ShiftStore};
    use chrono::Utc;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    async fn setup() -> (Arc<InMemoryStore>, AttendanceService<InMemoryStore>, i64) {
        let store = Arc::new(InMemoryStore::new());
        let shift = store
            .add_shift(Shift {
                id: 0,
                name: "General".to_string(),
                code: "GEN".to_string(),
                start_time: time(9, 0),
                end_time: time(17, 0),
                grace_time_minutes: 15,
                working_hours: dec("8"),
            })
            .await
            .unwrap();
        let mut employee = Employee::new(0, "E001", "Rahim", "Uddin");
        employee.shift_id = Some(shift.id);
        let employee = store.add_employee(employee).await.unwrap();
        let service = AttendanceService::new(Arc::clone(&store), WeekendHolidayOverlap::CountTwice);
        (store, service, employee.id)
    }

    async fn add_leave(
        store: &InMemoryStore,
        employee_id: i64,
        leave_type_id: i64,
        start: NaiveDate,
        end: NaiveDate,
        status: LeaveStatus,
    ) {
        store
            .add_leave(Leave {
                id: 0,
                employee_id,
                leave_type_id,
                start_date: start,
                end_date: end,
                total_days: Leave::requested_days(start, end, false),
                reason: None,
                status,
                applied_on: Utc::now(),
                approved_by: None,
                approval_date: None,
                approval_remarks: None,
                is_half_day: false,
                half_day_portion: None,
                cancelled_by: None,
                cancelled_date: None,
                cancellation_reason: None,
            })
            .await
            .unwrap();
    }

    // ==========================================================================
    // Reconciliation
    // ==========================================================================

    #[tokio::test]
    async fn test_calculate_january_with_paid_leave() {
        let (store, service, employee_id) = setup().await;
        store
            .add_holiday(Holiday {
                id: 0,
                date: date(2024, 1, 26),
                name: "Holiday".to_string(),
                holiday_type: HolidayType::National,
                is_repeat_annually: false,
            })
            .await
            .unwrap();
        let annual = store
            .add_leave_type(LeaveType {
                id: 0,
                name: "Annual".to_string(),
                code: "AL".to_string(),
                is_paid_leave: true,
                is_carry_forward_allowed: false,
                max_carry_forward_days: None,
                is_active: true,
            })
            .await
            .unwrap();

        // 20 present weekdays
        let weekdays: Vec<NaiveDate> = date(2024, 1, 1)
            .iter_days()
            .take_while(|d| *d <= date(2024, 1, 31))
            .filter(|d| !crate::calculation::is_weekend(*d) && *d != date(2024, 1, 26))
            .take(20)
            .collect();
        for day in &weekdays {
            store
                .add_attendance(Attendance::with_status(
                    employee_id,
                    *day,
                    AttendanceStatus::Present,
                ))
                .await
                .unwrap();
        }
        add_leave(&store, employee_id, annual.id, date(2024, 1, 30), date(2024, 1, 31), LeaveStatus::Approved).await;
        add_leave(&store, employee_id, annual.id, date(2024, 1, 10), date(2024, 1, 12), LeaveStatus::Pending).await;

        let result = service
            .calculate(employee_id, date(2024, 1, 1), date(2024, 1, 31))
            .await
            .unwrap();

        assert_eq!(result.working_days, 22);
        assert_eq!(result.present_days, 20);
        assert_eq!(result.paid_leave_days, dec("2"));
        // min(20 + 2 + 1, 22)
        assert_eq!(result.paid_days, 22);
    }

    #[tokio::test]
    async fn test_leave_with_missing_type_is_unpaid() {
        let (store, service, employee_id) = setup().await;
        add_leave(&store, employee_id, 999, date(2024, 1, 8), date(2024, 1, 9), LeaveStatus::Approved).await;

        let result = service
            .calculate(employee_id, date(2024, 1, 1), date(2024, 1, 31))
            .await
            .unwrap();
        assert_eq!(result.unpaid_leave_days, dec("2"));
        assert_eq!(result.paid_leave_days, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_working_days_only() {
        let (_store, service, _) = setup().await;
        let working = service
            .working_days(date(2024, 1, 1), date(2024, 1, 31))
            .await
            .unwrap();
        assert_eq!(working, 23);
    }

    #[tokio::test]
    async fn test_reversed_range_is_validation_error() {
        let (_store, service, employee_id) = setup().await;
        let err = service
            .calculate(employee_id, date(2024, 1, 31), date(2024, 1, 1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    // ==========================================================================
    // Clock-in / clock-out
    // ==========================================================================

    #[tokio::test]
    async fn test_clock_in_within_grace_is_present() {
        let (_store, service, employee_id) = setup().await;
        let row = service
            .clock_in(employee_id, date(2024, 1, 2), time(9, 15), EntryType::Biometric)
            .await
            .unwrap();
        assert_eq!(row.status, AttendanceStatus::Present);
        assert!(row.late_minutes.is_none());
        assert_eq!(row.entry_type, EntryType::Biometric);
    }

    #[tokio::test]
    async fn test_clock_in_after_grace_is_late_from_shift_start() {
        let (_store, service, employee_id) = setup().await;
        let row = service
            .clock_in(employee_id, date(2024, 1, 2), time(9, 20), EntryType::Web)
            .await
            .unwrap();
        assert_eq!(row.status, AttendanceStatus::Late);
        assert_eq!(row.late_minutes, Some(20));
    }

    #[tokio::test]
    async fn test_clock_in_twice_conflicts() {
        let (_store, service, employee_id) = setup().await;
        service
            .clock_in(employee_id, date(2024, 1, 2), time(9, 0), EntryType::Web)
            .await
            .unwrap();
        let err = service
            .clock_in(employee_id, date(2024, 1, 2), time(9, 5), EntryType::Web)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_clock_in_unknown_employee_is_not_found() {
        let (_store, service, _) = setup().await;
        let err = service
            .clock_in(404, date(2024, 1, 2), time(9, 0), EntryType::Web)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_clock_out_with_overtime() {
        let (_store, service, employee_id) = setup().await;
        service
            .clock_in(employee_id, date(2024, 1, 2), time(9, 0), EntryType::Web)
            .await
            .unwrap();
        let row = service
            .clock_out(employee_id, date(2024, 1, 2), time(18, 30))
            .await
            .unwrap();
        assert_eq!(row.working_hours, Some(dec("9.5")));
        assert_eq!(row.overtime_hours, Some(dec("1.5")));
        assert!(row.early_leaving_minutes.is_none());
    }

    #[tokio::test]
    async fn test_clock_out_early() {
        let (_store, service, employee_id) = setup().await;
        service
            .clock_in(employee_id, date(2024, 1, 2), time(9, 0), EntryType::Web)
            .await
            .unwrap();
        let row = service
            .clock_out(employee_id, date(2024, 1, 2), time(16, 20))
            .await
            .unwrap();
        assert_eq!(row.early_leaving_minutes, Some(40));
        assert_eq!(row.working_hours, Some(dec("7.33")));
        assert!(row.overtime_hours.is_none());
    }

    async fn night_worker(store: &InMemoryStore) -> i64 {
        let shift = store
            .add_shift(Shift {
                id: 0,
                name: "Night".to_string(),
                code: "NGT".to_string(),
                start_time: time(22, 0),
                end_time: time(6, 0),
                grace_time_minutes: 10,
                working_hours: dec("8"),
            })
            .await
            .unwrap();
        let mut employee = Employee::new(0, "E009", "Nasir", "Ahmed");
        employee.shift_id = Some(shift.id);
        store.add_employee(employee).await.unwrap().id
    }

    #[tokio::test]
    async fn test_clock_out_after_midnight_on_night_shift() {
        let (store, service, _) = setup().await;
        let employee_id = night_worker(&store).await;
        service
            .clock_in(employee_id, date(2024, 1, 2), time(22, 0), EntryType::Biometric)
            .await
            .unwrap();
        let row = service
            .clock_out(employee_id, date(2024, 1, 2), time(7, 0))
            .await
            .unwrap();
        assert_eq!(row.working_hours, Some(dec("9")));
        assert_eq!(row.overtime_hours, Some(dec("1")));
        assert!(row.early_leaving_minutes.is_none());
    }

    #[tokio::test]
    async fn test_night_shift_early_leaving_spans_midnight() {
        let (store, service, _) = setup().await;
        let employee_id = night_worker(&store).await;
        service
            .clock_in(employee_id, date(2024, 1, 2), time(22, 0), EntryType::Biometric)
            .await
            .unwrap();
        let row = service
            .clock_out(employee_id, date(2024, 1, 2), time(23, 30))
            .await
            .unwrap();
        assert_eq!(row.working_hours, Some(dec("1.5")));
        assert_eq!(row.early_leaving_minutes, Some(390));
    }

    #[tokio::test]
    async fn test_clock_out_before_clock_in_on_day_shift_is_rejected() {
        let (_store, service, employee_id) = setup().await;
        service
            .clock_in(employee_id, date(2024, 1, 2), time(9, 0), EntryType::Web)
            .await
            .unwrap();
        let err = service
            .clock_out(employee_id, date(2024, 1, 2), time(8, 0))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_clock_out_without_clock_in_is_not_found() {
        let (_store, service, employee_id) = setup().await;
        let err = service
            .clock_out(employee_id, date(2024, 1, 2), time(17, 0))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_correct_rederives_hours() {
        let (_store, service, employee_id) = setup().await;
        let row = service
            .clock_in(employee_id, date(2024, 1, 2), time(9, 40), EntryType::Web)
            .await
            .unwrap();

        let corrected = service
            .correct(
                row.id,
                AttendanceCorrection {
                    status: AttendanceStatus::Present,
                    clock_in: Some(time(9, 0)),
                    clock_out: Some(time(17, 0)),
                    remarks: Some("Device clock drift".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(corrected.status, AttendanceStatus::Present);
        assert!(corrected.late_minutes.is_none());
        assert_eq!(corrected.working_hours, Some(dec("8")));
        assert_eq!(corrected.remarks.as_deref(), Some("Device clock drift"));
    }

    #[tokio::test]
    async fn test_daily_stats_and_today_lookups() {
        let (store, service, employee_id) = setup().await;
        let other = store
            .add_employee(Employee::new(0, "E002", "Karim", "Hossain"))
            .await
            .unwrap();
        let today = date(2024, 1, 2);
        service
            .clock_in(employee_id, today, time(9, 30), EntryType::Web)
            .await
            .unwrap();
        service
            .clock_in(other.id, today, time(8, 55), EntryType::Web)
            .await
            .unwrap();

        let stats = service.daily_stats(today).await.unwrap();
        assert_eq!(stats.late, 1);
        assert_eq!(stats.present, 1);
        assert_eq!(service.attendance_on(today).await.unwrap().len(), 2);
        assert!(service
            .attendance_for_day(employee_id, today)
            .await
            .unwrap()
            .is_some());

        let single = service.calculate_for_day(employee_id, today).await.unwrap();
        assert_eq!(single.total_calendar_days, 1);
        assert_eq!(single.late_days, 1);
        assert_eq!(single.paid_days, 1);
    }
}
