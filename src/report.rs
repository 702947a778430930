//! The dashboard bundle: every series a presentation layer needs for one
//! filter state, in one serializable value.

use serde::Serialize;

use crate::{
    aggregate::{
        self, GroupMean, MapCenter, MapMarker, Summary, ValueShare, with_host_status,
    },
    columns::{
        ANNUAL_REVENUE, HOST_STATUS, OCCUPANCY_PERCENTAGE, PRICE_PER_GUEST, RATING_OVERALL,
        ROOM_TYPE_CLEAN,
    },
    filter::FilteredView,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub summary: Summary,
    pub map_center: Option<MapCenter>,
    pub room_type_distribution: Vec<ValueShare>,
    pub revenue_by_room_type: Vec<GroupMean>,
    pub occupancy_by_room_type: Vec<GroupMean>,
    pub revenue_by_host_status: Vec<GroupMean>,
    pub rating_by_host_status: Vec<GroupMean>,
    /// Positive means only, highest first.
    pub price_per_guest_by_room_type: Vec<GroupMean>,
    pub markers: Vec<MapMarker>,
}

impl DashboardReport {
    pub fn build(view: &FilteredView<'_>) -> Self {
        let labelled = with_host_status(view.clone());

        let mut price_per_guest = aggregate::group_mean(view, ROOM_TYPE_CLEAN, PRICE_PER_GUEST);
        price_per_guest.retain(|g| g.mean.is_some_and(|m| m > 0.0));
        price_per_guest.sort_by(|a, b| {
            let a = a.mean.unwrap_or(0.0);
            let b = b.mean.unwrap_or(0.0);
            b.total_cmp(&a)
        });

        Self {
            summary: aggregate::summary(view),
            map_center: aggregate::map_center(view),
            room_type_distribution: aggregate::value_counts_with_percentage(view, ROOM_TYPE_CLEAN),
            revenue_by_room_type: aggregate::group_mean(view, ROOM_TYPE_CLEAN, ANNUAL_REVENUE),
            occupancy_by_room_type: aggregate::group_mean(
                view,
                ROOM_TYPE_CLEAN,
                OCCUPANCY_PERCENTAGE,
            ),
            revenue_by_host_status: aggregate::group_mean(&labelled, HOST_STATUS, ANNUAL_REVENUE),
            rating_by_host_status: aggregate::group_mean(&labelled, HOST_STATUS, RATING_OVERALL),
            price_per_guest_by_room_type: price_per_guest,
            markers: aggregate::markers(view),
        }
    }

    /// Named chart series, in display order.
    pub fn group_series(&self) -> Vec<(&'static str, &[GroupMean])> {
        vec![
            ("Mean annual revenue by room type", self.revenue_by_room_type.as_slice()),
            ("Mean occupancy (%) by room type", self.occupancy_by_room_type.as_slice()),
            ("Mean annual revenue by host status", self.revenue_by_host_status.as_slice()),
            ("Mean overall rating by host status", self.rating_by_host_status.as_slice()),
            ("Mean price per guest by room type", self.price_per_guest_by_room_type.as_slice()),
        ]
    }
}
