//! The signed-in user's trips: the searchable, paginated list and the
//! confirm-before-write mutation workflow.

mod draft;
mod list;
mod mutation;

pub use self::draft::{normalize_tags, parse_coordinate, TripDraft, TripForm, TripPayload};
pub use self::list::{PageLabel, PageLabels, TripList, ELLIPSIS, PAGE_WINDOW, TRIPS_PER_PAGE};
pub use self::mutation::{
    ActionKind, ConfirmColor, ConfirmationRequest, Execution, IconKind, ModalMode,
    MutationError, PendingAction, TripModal, TripMutations, DELETE_FAILED_ALERT,
    SAVE_FAILED_ALERT, SIGN_IN_ALERT, UPLOAD_FAILED_ALERT,
};
