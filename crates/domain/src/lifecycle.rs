//! Space lifecycle classification.
//!
//! A space ages from the creation time of its oldest application or service
//! instance. The anchor is clamped to the policy epoch, floored to a 24 hour
//! boundary, and the whole days elapsed since then decide whether the space is
//! left alone, its members are warned, or it is purged.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use spacewarden_core::{AppError, AppResult};

use crate::{Application, Guid, ServiceInstance, Space, SpaceResource};

const SECONDS_PER_DAY: i64 = 86_400;

/// Resources partitioned by owning space, in input order within each bucket.
///
/// A space without resources has no bucket; [`ResourcesBySpace::get`] answers
/// an empty slice for it.
#[derive(Debug)]
pub struct ResourcesBySpace<'a, R> {
    groups: HashMap<&'a Guid, Vec<&'a R>>,
}

impl<'a, R: SpaceResource> ResourcesBySpace<'a, R> {
    /// Groups resources by the space they belong to.
    #[must_use]
    pub fn group(resources: &'a [R]) -> Self {
        let mut groups: HashMap<&'a Guid, Vec<&'a R>> = HashMap::new();

        for resource in resources {
            groups
                .entry(resource.space_guid())
                .or_default()
                .push(resource);
        }

        Self { groups }
    }

    /// Returns the resources of one space.
    #[must_use]
    pub fn get(&self, space_guid: &Guid) -> &[&'a R] {
        self.groups
            .get(space_guid)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    #[cfg(test)]
    fn space_count(&self) -> usize {
        self.groups.len()
    }

    #[cfg(test)]
    fn iter(&self) -> impl Iterator<Item = (&'a Guid, &[&'a R])> {
        self.groups
            .iter()
            .map(|(space_guid, bucket)| (*space_guid, bucket.as_slice()))
    }
}

/// Parses the creation time of a resource.
pub fn parse_created_at<R: SpaceResource + ?Sized>(resource: &R) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(resource.created_at())
        .map(|created_at| created_at.with_timezone(&Utc))
        .map_err(|error| AppError::MalformedTimestamp {
            resource: format!("{} '{}'", resource.kind().as_str(), resource.guid()),
            value: resource.created_at().to_owned(),
            reason: error.to_string(),
        })
}

/// Returns the earliest creation time across the applications and service
/// instances of `space`, or `None` when the space holds neither.
///
/// The first unparsable timestamp aborts the lookup.
pub fn earliest_creation(
    space: &Space,
    applications: &ResourcesBySpace<'_, Application>,
    instances: &ResourcesBySpace<'_, ServiceInstance>,
) -> AppResult<Option<DateTime<Utc>>> {
    let created = applications
        .get(&space.guid)
        .iter()
        .map(|application| parse_created_at(*application))
        .chain(
            instances
                .get(&space.guid)
                .iter()
                .map(|instance| parse_created_at(*instance)),
        );

    let mut earliest: Option<DateTime<Utc>> = None;
    for created_at in created {
        let created_at = created_at?;
        earliest = Some(earliest.map_or(created_at, |current| current.min(created_at)));
    }

    Ok(earliest)
}

/// Floors an instant to a multiple of 24 hours since the Unix epoch.
pub fn truncate_to_day(instant: DateTime<Utc>) -> AppResult<DateTime<Utc>> {
    let seconds = instant.timestamp().div_euclid(SECONDS_PER_DAY) * SECONDS_PER_DAY;
    DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
        AppError::Internal(format!("instant {instant} cannot be truncated to a day"))
    })
}

/// Whole days between `anchor` and `now`, rounded toward zero.
#[must_use]
pub fn age_in_days(anchor: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - anchor).num_hours() / 24
}

/// Where a space stands relative to the policy thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleStage {
    /// Younger than the notify threshold.
    Active,
    /// Old enough to warn its members.
    Notify,
    /// Old enough to delete.
    Purge,
}

/// Two-threshold aging policy anchored to an epoch floor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecyclePolicy {
    notify_threshold_days: u32,
    purge_threshold_days: u32,
    time_starts_at: DateTime<Utc>,
}

impl LifecyclePolicy {
    /// Creates a policy. The notify threshold must not exceed the purge threshold.
    pub fn new(
        notify_threshold_days: u32,
        purge_threshold_days: u32,
        time_starts_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        if notify_threshold_days > purge_threshold_days {
            return Err(AppError::Validation(format!(
                "notify threshold ({notify_threshold_days} days) must not exceed purge threshold ({purge_threshold_days} days)"
            )));
        }

        Ok(Self {
            notify_threshold_days,
            purge_threshold_days,
            time_starts_at,
        })
    }

    /// Days after which members are warned.
    #[must_use]
    pub fn notify_threshold_days(&self) -> u32 {
        self.notify_threshold_days
    }

    /// Days after which the space is deleted.
    #[must_use]
    pub fn purge_threshold_days(&self) -> u32 {
        self.purge_threshold_days
    }

    /// Earliest instant accepted as an anchor.
    #[must_use]
    pub fn time_starts_at(&self) -> DateTime<Utc> {
        self.time_starts_at
    }

    /// Clamps `earliest` to the epoch floor, then truncates it to a day boundary.
    pub fn anchor(&self, earliest: DateTime<Utc>) -> AppResult<DateTime<Utc>> {
        truncate_to_day(earliest.max(self.time_starts_at))
    }

    /// Maps an age in days onto a stage. Thresholds are inclusive and purge wins.
    #[must_use]
    pub fn stage(&self, age_days: i64) -> LifecycleStage {
        if age_days >= i64::from(self.purge_threshold_days) {
            LifecycleStage::Purge
        } else if age_days >= i64::from(self.notify_threshold_days) {
            LifecycleStage::Notify
        } else {
            LifecycleStage::Active
        }
    }

    /// Instant at which a space anchored at `anchor` becomes due for purge.
    #[must_use]
    pub fn purge_due_at(&self, anchor: DateTime<Utc>) -> Option<DateTime<Utc>> {
        anchor.checked_add_signed(TimeDelta::days(i64::from(self.purge_threshold_days)))
    }
}

/// A space paired with the anchor it was aged from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceClassification {
    /// Clamped and truncated birth instant.
    pub anchor: DateTime<Utc>,
    /// The classified space.
    pub space: Space,
}

/// Spaces that need action, each list in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationReport {
    /// Spaces whose members should be warned.
    pub to_notify: Vec<SpaceClassification>,
    /// Spaces that should be deleted.
    pub to_purge: Vec<SpaceClassification>,
}

impl ClassificationReport {
    /// Returns true when no space needs action.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_notify.is_empty() && self.to_purge.is_empty()
    }
}

/// Partitions `spaces` into those due for notification and those due for purge.
///
/// Spaces without applications or service instances are skipped. A single
/// malformed creation time fails the whole call so that no partial result is
/// ever acted upon.
pub fn classify_spaces(
    spaces: &[Space],
    applications: &[Application],
    instances: &[ServiceInstance],
    now: DateTime<Utc>,
    policy: &LifecyclePolicy,
) -> AppResult<ClassificationReport> {
    let applications = ResourcesBySpace::group(applications);
    let instances = ResourcesBySpace::group(instances);
    let mut report = ClassificationReport::default();

    for space in spaces {
        let Some(earliest) = earliest_creation(space, &applications, &instances)? else {
            continue;
        };

        let anchor = policy.anchor(earliest)?;
        let classification = SpaceClassification {
            anchor,
            space: space.clone(),
        };

        match policy.stage(age_in_days(anchor, now)) {
            LifecycleStage::Purge => report.to_purge.push(classification),
            LifecycleStage::Notify => report.to_notify.push(classification),
            LifecycleStage::Active => {}
        }
    }

    Ok(report)
}
