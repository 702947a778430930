//! Column names the pipeline knows about.
//!
//! Sources may carry any number of other columns; those pass through the
//! cleaning steps untouched unless a name-based imputation rule picks them up.

pub const LISTING_ID: &str = "listing_id";
pub const LISTING_NAME: &str = "listing_name";
pub const HOST_NAME: &str = "host_name";
pub const AMENITIES: &str = "amenities";
pub const ROOM_TYPE: &str = "room_type";
pub const ROOM_TYPE_CLEAN: &str = "room_type_clean";
pub const LISTING_TYPE: &str = "listing_type";

pub const GUESTS: &str = "guests";
pub const BEDROOMS: &str = "bedrooms";
pub const BEDS: &str = "beds";
pub const BATHS: &str = "baths";
pub const NUM_REVIEWS: &str = "num_reviews";
pub const RATING_OVERALL: &str = "rating_overall";
pub const MIN_NIGHTS: &str = "min_nights";
pub const CLEANING_FEE: &str = "cleaning_fee";
pub const EXTRA_GUEST_FEE: &str = "extra_guest_fee";
pub const PHOTOS_COUNT: &str = "photos_count";
pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";

pub const NIGHTLY_RATE: &str = "ttm_avg_rate_native";
pub const ANNUAL_REVENUE: &str = "ttm_revenue_native";
pub const OCCUPANCY: &str = "ttm_occupancy";

pub const SUPERHOST: &str = "superhost";
pub const REGISTRATION: &str = "registration";
pub const INSTANT_BOOK: &str = "instant_book";
pub const PROFESSIONAL_MANAGEMENT: &str = "professional_management";

pub const PRICE_PER_GUEST: &str = "price_per_guest";
pub const OCCUPANCY_PERCENTAGE: &str = "occupancy_percentage";
/// View-local label column, never stored in the cleaned dataset.
pub const HOST_STATUS: &str = "host_status";

/// Free-text columns run through [`crate::normalize::clean_text`].
pub const TEXT_COLUMNS: &[&str] = &[LISTING_NAME, HOST_NAME, AMENITIES];

/// Columns that are never type-inferred. Identifiers stay textual so large
/// numeric ids keep every digit.
pub const FORCED_TEXT_COLUMNS: &[&str] = &[LISTING_ID, LISTING_NAME, HOST_NAME, AMENITIES];

pub const CAPACITY_COLUMNS: &[&str] = &[BEDROOMS, BEDS, BATHS, GUESTS];

pub const FLAG_COLUMNS: &[&str] = &[SUPERHOST, REGISTRATION, INSTANT_BOOK, PROFESSIONAL_MANAGEMENT];

/// Columns coerced to numbers after imputation; unparseable cells become
/// missing.
pub const NUMERIC_COLUMNS: &[&str] = &[
    GUESTS,
    BEDROOMS,
    BEDS,
    BATHS,
    MIN_NIGHTS,
    CLEANING_FEE,
    EXTRA_GUEST_FEE,
    NUM_REVIEWS,
    LATITUDE,
    LONGITUDE,
    PHOTOS_COUNT,
    RATING_OVERALL,
    NIGHTLY_RATE,
    ANNUAL_REVENUE,
    OCCUPANCY,
];

/// Rows missing any of these cannot be identified or mapped.
pub const CRITICAL_COLUMNS: &[&str] = &[LISTING_ID, LATITUDE, LONGITUDE];

pub const NON_NEGATIVE_COLUMNS: &[&str] = &[
    GUESTS,
    BEDROOMS,
    BEDS,
    BATHS,
    NUM_REVIEWS,
    CLEANING_FEE,
    MIN_NIGHTS,
];
