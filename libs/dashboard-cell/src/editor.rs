//! Doctor profile editor.
//!
//! The draft is a local copy of the doctor document. The three sub-record
//! collections are edited through [`DraftList`], whose rows carry a stable
//! [`RowId`] so deleting one row never retargets edits aimed at another.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use doctor_cell::models::{Doctor, Experience, Qualification, TimeSlot, UpdateDoctorRequest};

use crate::api::ApiClient;
use crate::error::{ClientError, EditorError};
use crate::upload::CloudinaryUploader;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowId(Uuid);

impl RowId {
    fn new() -> Self {
        RowId(Uuid::new_v4())
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A sub-record whose fields the form edits by name.
pub trait EditableRecord: Clone {
    fn set_field(&mut self, field: &str, value: &str) -> Result<(), EditorError>;
}

impl EditableRecord for Qualification {
    fn set_field(&mut self, field: &str, value: &str) -> Result<(), EditorError> {
        let target = match field {
            "startingDate" => &mut self.starting_date,
            "endingDate" => &mut self.ending_date,
            "degree" => &mut self.degree,
            "university" => &mut self.university,
            other => return Err(EditorError::UnknownField(other.to_string())),
        };
        *target = value.to_string();
        Ok(())
    }
}

impl EditableRecord for Experience {
    fn set_field(&mut self, field: &str, value: &str) -> Result<(), EditorError> {
        let target = match field {
            "startingDate" => &mut self.starting_date,
            "endingDate" => &mut self.ending_date,
            "position" => &mut self.position,
            "hospital" => &mut self.hospital,
            other => return Err(EditorError::UnknownField(other.to_string())),
        };
        *target = value.to_string();
        Ok(())
    }
}

impl EditableRecord for TimeSlot {
    fn set_field(&mut self, field: &str, value: &str) -> Result<(), EditorError> {
        let target = match field {
            "day" => &mut self.day,
            "startingTime" => &mut self.starting_time,
            "endingTime" => &mut self.ending_time,
            other => return Err(EditorError::UnknownField(other.to_string())),
        };
        *target = value.to_string();
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row<T> {
    pub id: RowId,
    pub record: T,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraftList<T> {
    rows: Vec<Row<T>>,
}

impl<T: EditableRecord> DraftList<T> {
    pub fn from_records(records: &[T]) -> Self {
        Self {
            rows: records
                .iter()
                .cloned()
                .map(|record| Row { id: RowId::new(), record })
                .collect(),
        }
    }

    pub fn push(&mut self, record: T) -> RowId {
        let id = RowId::new();
        self.rows.push(Row { id, record });
        id
    }

    pub fn remove(&mut self, id: RowId) -> Option<T> {
        let index = self.rows.iter().position(|row| row.id == id)?;
        Some(self.rows.remove(index).record)
    }

    pub fn get(&self, id: RowId) -> Option<&T> {
        self.rows.iter().find(|row| row.id == id).map(|row| &row.record)
    }

    pub fn edit(&mut self, id: RowId, field: &str, value: &str) -> Option<Result<(), EditorError>> {
        self.rows
            .iter_mut()
            .find(|row| row.id == id)
            .map(|row| row.record.set_field(field, value))
    }

    pub fn id_at(&self, index: usize) -> Option<RowId> {
        self.rows.get(index).map(|row| row.id)
    }

    pub fn rows(&self) -> &[Row<T>] {
        &self.rows
    }

    pub fn records(&self) -> Vec<T> {
        self.rows.iter().map(|row| row.record.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Qualifications,
    Experiences,
    TimeSlots,
}

impl Collection {
    pub fn key(&self) -> &'static str {
        match self {
            Collection::Qualifications => "qualifications",
            Collection::Experiences => "experiences",
            Collection::TimeSlots => "timeSlots",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubRecord {
    Qualification(Qualification),
    Experience(Experience),
    TimeSlot(TimeSlot),
}

impl SubRecord {
    pub fn collection(&self) -> Collection {
        match self {
            SubRecord::Qualification(_) => Collection::Qualifications,
            SubRecord::Experience(_) => Collection::Experiences,
            SubRecord::TimeSlot(_) => Collection::TimeSlots,
        }
    }

    /// The empty row the form appends for `collection`.
    pub fn blank(collection: Collection) -> Self {
        match collection {
            Collection::Qualifications => SubRecord::Qualification(Qualification::default()),
            Collection::Experiences => SubRecord::Experience(Experience::default()),
            Collection::TimeSlots => SubRecord::TimeSlot(TimeSlot::default()),
        }
    }
}

/// Local, not yet persisted copy of a doctor document.
#[derive(Debug, Clone, PartialEq)]
pub struct DoctorDraft {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub bio: String,
    pub gender: String,
    pub specialization: String,
    pub ticket_price: Option<f64>,
    pub about: String,
    pub photo: Option<String>,
    pub qualifications: DraftList<Qualification>,
    pub experiences: DraftList<Experience>,
    pub time_slots: DraftList<TimeSlot>,
}

impl DoctorDraft {
    pub fn from_doctor(doctor: &Doctor) -> Self {
        Self {
            id: doctor.id.clone(),
            name: doctor.name.clone(),
            email: doctor.email.clone(),
            phone: doctor.phone.clone().unwrap_or_default(),
            bio: doctor.bio.clone().unwrap_or_default(),
            gender: doctor.gender.clone().unwrap_or_default(),
            specialization: doctor.specialization.clone().unwrap_or_default(),
            ticket_price: doctor.ticket_price,
            about: doctor.about.clone().unwrap_or_default(),
            photo: doctor.photo.clone(),
            qualifications: DraftList::from_records(&doctor.qualifications),
            experiences: DraftList::from_records(&doctor.experiences),
            time_slots: DraftList::from_records(&doctor.time_slots),
        }
    }

    /// The whole draft as one full-document update.
    pub fn to_update_request(&self) -> UpdateDoctorRequest {
        UpdateDoctorRequest {
            name: Some(self.name.clone()),
            email: Some(self.email.clone()),
            phone: Some(self.phone.clone()),
            photo: self.photo.clone(),
            ticket_price: self.ticket_price,
            specialization: Some(self.specialization.clone()),
            qualifications: Some(self.qualifications.records()),
            experiences: Some(self.experiences.records()),
            bio: Some(self.bio.clone()),
            about: Some(self.about.clone()),
            gender: Some(self.gender.clone()),
            time_slots: Some(self.time_slots.records()),
            is_approved: None,
        }
    }

    fn set_scalar(&mut self, field: &str, value: &str) -> Result<(), EditorError> {
        let target = match field {
            "name" => &mut self.name,
            "phone" => &mut self.phone,
            "bio" => &mut self.bio,
            "gender" => &mut self.gender,
            "specialization" => &mut self.specialization,
            "about" => &mut self.about,
            "email" => return Err(EditorError::ReadOnly(field.to_string())),
            "ticketPrice" => {
                self.ticket_price = parse_price(value)?;
                return Ok(());
            }
            other => return Err(EditorError::UnknownField(other.to_string())),
        };
        *target = value.to_string();
        Ok(())
    }
}

fn parse_price(value: &str) -> Result<Option<f64>, EditorError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price >= 0.0)
        .map(Some)
        .ok_or_else(|| EditorError::InvalidValue {
            field: "ticketPrice".to_string(),
            reason: format!("'{}' is not a non-negative number", value),
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// Transient toast shown after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

/// Shared view of the editor's busy state, readable while a submit runs.
#[derive(Debug, Clone, Default)]
pub struct BusyIndicator(Arc<AtomicBool>);

impl BusyIndicator {
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn set(&self, busy: bool) {
        self.0.store(busy, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Applied,
    /// The draft has unsaved edits; the source waits for `discard_changes`.
    Deferred,
}

pub struct ProfileEditor {
    draft: DoctorDraft,
    baseline: Doctor,
    pending_source: Option<Doctor>,
    dirty: bool,
    busy: BusyIndicator,
    notifications: Vec<Notification>,
}

impl ProfileEditor {
    pub fn new(source: Doctor) -> Self {
        Self {
            draft: DoctorDraft::from_doctor(&source),
            baseline: source,
            pending_source: None,
            dirty: false,
            busy: BusyIndicator::default(),
            notifications: Vec::new(),
        }
    }

    pub fn draft(&self) -> &DoctorDraft {
        &self.draft
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_saving(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn busy_indicator(&self) -> BusyIndicator {
        self.busy.clone()
    }

    pub fn has_pending_source(&self) -> bool {
        self.pending_source.is_some()
    }

    /// Replace the draft with fresh source data unless it holds unsaved edits.
    pub fn sync_from_source(&mut self, source: Doctor) -> SyncOutcome {
        if self.dirty {
            debug!("Draft for {} is dirty, deferring fresh source", source.id);
            self.pending_source = Some(source);
            return SyncOutcome::Deferred;
        }
        self.draft = DoctorDraft::from_doctor(&source);
        self.baseline = source;
        self.pending_source = None;
        SyncOutcome::Applied
    }

    /// Drop unsaved edits, adopting a deferred source if one arrived.
    pub fn discard_changes(&mut self) {
        if let Some(source) = self.pending_source.take() {
            self.baseline = source;
        }
        self.draft = DoctorDraft::from_doctor(&self.baseline);
        self.dirty = false;
    }

    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), EditorError> {
        self.draft.set_scalar(field, value)?;
        self.dirty = true;
        Ok(())
    }

    pub fn add_item(&mut self, item: SubRecord) -> RowId {
        self.dirty = true;
        match item {
            SubRecord::Qualification(record) => self.draft.qualifications.push(record),
            SubRecord::Experience(record) => self.draft.experiences.push(record),
            SubRecord::TimeSlot(record) => self.draft.time_slots.push(record),
        }
    }

    /// Append a blank row to `collection`, as the "Add" buttons do.
    pub fn add_blank(&mut self, collection: Collection) -> RowId {
        self.add_item(SubRecord::blank(collection))
    }

    pub fn delete_item(&mut self, collection: Collection, row: RowId) -> Result<(), EditorError> {
        let removed = match collection {
            Collection::Qualifications => self.draft.qualifications.remove(row).is_some(),
            Collection::Experiences => self.draft.experiences.remove(row).is_some(),
            Collection::TimeSlots => self.draft.time_slots.remove(row).is_some(),
        };
        if !removed {
            return Err(EditorError::UnknownRow(row.to_string(), collection.key()));
        }
        self.dirty = true;
        Ok(())
    }

    pub fn edit_field(
        &mut self,
        collection: Collection,
        row: RowId,
        field: &str,
        value: &str,
    ) -> Result<(), EditorError> {
        let outcome = match collection {
            Collection::Qualifications => self.draft.qualifications.edit(row, field, value),
            Collection::Experiences => self.draft.experiences.edit(row, field, value),
            Collection::TimeSlots => self.draft.time_slots.edit(row, field, value),
        };
        outcome.ok_or_else(|| EditorError::UnknownRow(row.to_string(), collection.key()))??;
        self.dirty = true;
        Ok(())
    }

    /// Stable id of the row currently rendered at `index`.
    pub fn row_id_at(&self, collection: Collection, index: usize) -> Option<RowId> {
        match collection {
            Collection::Qualifications => self.draft.qualifications.id_at(index),
            Collection::Experiences => self.draft.experiences.id_at(index),
            Collection::TimeSlots => self.draft.time_slots.id_at(index),
        }
    }

    /// Upload `bytes` and point the draft's photo at the stored image. The
    /// draft is untouched until the upload succeeds.
    pub async fn attach_photo(
        &mut self,
        uploader: &CloudinaryUploader,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ClientError> {
        match uploader.upload(file_name, bytes).await {
            Ok(url) => {
                self.draft.photo = Some(url.clone());
                self.dirty = true;
                Ok(url)
            }
            Err(err) => {
                self.notify(NotificationKind::Error, err.to_string());
                Err(err)
            }
        }
    }

    /// Send the whole draft as one `PUT /doctors/{id}`. Failures leave the
    /// draft as it was and surface as an error notification.
    pub async fn submit(&mut self, api: &ApiClient) -> Result<Doctor, ClientError> {
        let body = self.draft.to_update_request();
        let path = format!("/doctors/{}", self.draft.id);

        self.busy.set(true);
        let result = api.put_json::<_, Doctor>(&path, &body).await;
        self.busy.set(false);

        match result {
            Ok((message, doctor)) => {
                self.notify(NotificationKind::Success, message);
                self.baseline = doctor.clone();
                self.pending_source = None;
                self.dirty = false;
                Ok(doctor)
            }
            Err(err) => {
                warn!("Profile update for {} failed: {}", self.draft.id, err);
                self.notify(NotificationKind::Error, err.to_string());
                Err(err)
            }
        }
    }

    fn notify(&mut self, kind: NotificationKind, message: String) {
        self.notifications.push(Notification { kind, message });
    }

    /// Drain notifications; each is shown once.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}
