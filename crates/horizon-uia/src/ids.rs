//! The UI Automation id vocabularies and small wire enums.
//!
//! Every numeric value here is read directly by the external client and must
//! match the platform headers exactly; none of them are implementation
//! choices. The large id spaces (patterns, properties, control types,
//! events) are open-ended newtypes with the published constants attached;
//! the closed sets are plain `repr` enums.

use std::ops::{BitOr, BitOrAssign};

/// A control pattern id (`UIA_*PatternId`).
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PatternId(pub u32);

/// A property id (`UIA_*PropertyId`).
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PropertyId(pub u32);

/// A control type id (`UIA_*ControlTypeId`).
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ControlTypeId(pub u32);

/// An event id (`UIA_*EventId`).
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EventId(pub u32);

#[rustfmt::skip]
impl PatternId {
    pub const ANNOTATION: Self            = Self(10023);
    pub const CUSTOM_NAVIGATION: Self     = Self(10033);
    pub const DOCK: Self                  = Self(10011);
    pub const DRAG: Self                  = Self(10030);
    pub const DROP_TARGET: Self           = Self(10031);
    pub const EXPAND_COLLAPSE: Self       = Self(10005);
    pub const GRID_ITEM: Self             = Self(10007);
    pub const GRID: Self                  = Self(10006);
    pub const INVOKE: Self                = Self(10000);
    pub const ITEM_CONTAINER: Self        = Self(10019);
    pub const LEGACY_I_ACCESSIBLE: Self   = Self(10018);
    pub const MULTIPLE_VIEW: Self         = Self(10008);
    pub const OBJECT_MODEL: Self          = Self(10022);
    pub const RANGE_VALUE: Self           = Self(10003);
    pub const SCROLL_ITEM: Self           = Self(10017);
    pub const SCROLL: Self                = Self(10004);
    pub const SELECTION_ITEM: Self        = Self(10010);
    pub const SELECTION: Self             = Self(10001);
    pub const SPREADSHEET: Self           = Self(10026);
    pub const SPREADSHEET_ITEM: Self      = Self(10027);
    pub const STYLES: Self                = Self(10025);
    pub const SYNCHRONIZED_INPUT: Self    = Self(10021);
    pub const TABLE_ITEM: Self            = Self(10013);
    pub const TABLE: Self                 = Self(10012);
    pub const TEXT_CHILD: Self            = Self(10029);
    pub const TEXT_EDIT: Self             = Self(10032);
    pub const TEXT: Self                  = Self(10014);
    pub const TEXT2: Self                 = Self(10024);
    pub const TOGGLE: Self                = Self(10015);
    pub const TRANSFORM: Self             = Self(10016);
    pub const TRANSFORM2: Self            = Self(10028);
    pub const VALUE: Self                 = Self(10002);
    pub const VIRTUALIZED_ITEM: Self      = Self(10020);
    pub const WINDOW: Self                = Self(10009);
}

#[rustfmt::skip]
impl PropertyId {
    pub const RUNTIME_ID: Self                               = Self(30000);
    pub const BOUNDING_RECTANGLE: Self                       = Self(30001);
    pub const PROCESS_ID: Self                               = Self(30002);
    pub const CONTROL_TYPE: Self                             = Self(30003);
    pub const LOCALIZED_CONTROL_TYPE: Self                   = Self(30004);
    pub const NAME: Self                                     = Self(30005);
    pub const ACCELERATOR_KEY: Self                          = Self(30006);
    pub const ACCESS_KEY: Self                               = Self(30007);
    pub const HAS_KEYBOARD_FOCUS: Self                       = Self(30008);
    pub const IS_KEYBOARD_FOCUSABLE: Self                    = Self(30009);
    pub const IS_ENABLED: Self                               = Self(30010);
    pub const AUTOMATION_ID: Self                            = Self(30011);
    pub const CLASS_NAME: Self                               = Self(30012);
    pub const HELP_TEXT: Self                                = Self(30013);
    pub const CLICKABLE_POINT: Self                          = Self(30014);
    pub const CULTURE: Self                                  = Self(30015);
    pub const IS_CONTROL_ELEMENT: Self                       = Self(30016);
    pub const IS_CONTENT_ELEMENT: Self                       = Self(30017);
    pub const LABELED_BY: Self                               = Self(30018);
    pub const IS_PASSWORD: Self                              = Self(30019);
    pub const NATIVE_WINDOW_HANDLE: Self                     = Self(30020);
    pub const ITEM_TYPE: Self                                = Self(30021);
    pub const IS_OFFSCREEN: Self                             = Self(30022);
    pub const ORIENTATION: Self                              = Self(30023);
    pub const FRAMEWORK_ID: Self                             = Self(30024);
    pub const IS_REQUIRED_FOR_FORM: Self                     = Self(30025);
    pub const ITEM_STATUS: Self                              = Self(30026);
    pub const IS_DOCK_PATTERN_AVAILABLE: Self                = Self(30027);
    pub const IS_EXPAND_COLLAPSE_PATTERN_AVAILABLE: Self     = Self(30028);
    pub const IS_GRID_ITEM_PATTERN_AVAILABLE: Self           = Self(30029);
    pub const IS_GRID_PATTERN_AVAILABLE: Self                = Self(30030);
    pub const IS_INVOKE_PATTERN_AVAILABLE: Self              = Self(30031);
    pub const IS_MULTIPLE_VIEW_PATTERN_AVAILABLE: Self       = Self(30032);
    pub const IS_RANGE_VALUE_PATTERN_AVAILABLE: Self         = Self(30033);
    pub const IS_SCROLL_PATTERN_AVAILABLE: Self              = Self(30034);
    pub const IS_SCROLL_ITEM_PATTERN_AVAILABLE: Self         = Self(30035);
    pub const IS_SELECTION_ITEM_PATTERN_AVAILABLE: Self      = Self(30036);
    pub const IS_SELECTION_PATTERN_AVAILABLE: Self           = Self(30037);
    pub const IS_TABLE_PATTERN_AVAILABLE: Self               = Self(30038);
    pub const IS_TABLE_ITEM_PATTERN_AVAILABLE: Self          = Self(30039);
    pub const IS_TEXT_PATTERN_AVAILABLE: Self                = Self(30040);
    pub const IS_TOGGLE_PATTERN_AVAILABLE: Self              = Self(30041);
    pub const IS_TRANSFORM_PATTERN_AVAILABLE: Self           = Self(30042);
    pub const IS_VALUE_PATTERN_AVAILABLE: Self               = Self(30043);
    pub const IS_WINDOW_PATTERN_AVAILABLE: Self              = Self(30044);
    pub const VALUE_VALUE: Self                              = Self(30045);
    pub const VALUE_IS_READ_ONLY: Self                       = Self(30046);
    pub const RANGE_VALUE_VALUE: Self                        = Self(30047);
    pub const RANGE_VALUE_IS_READ_ONLY: Self                 = Self(30048);
    pub const RANGE_VALUE_MINIMUM: Self                      = Self(30049);
    pub const RANGE_VALUE_MAXIMUM: Self                      = Self(30050);
    pub const RANGE_VALUE_LARGE_CHANGE: Self                 = Self(30051);
    pub const RANGE_VALUE_SMALL_CHANGE: Self                 = Self(30052);
    pub const SCROLL_HORIZONTAL_SCROLL_PERCENT: Self         = Self(30053);
    pub const SCROLL_HORIZONTAL_VIEW_SIZE: Self              = Self(30054);
    pub const SCROLL_VERTICAL_SCROLL_PERCENT: Self           = Self(30055);
    pub const SCROLL_VERTICAL_VIEW_SIZE: Self                = Self(30056);
    pub const SCROLL_HORIZONTALLY_SCROLLABLE: Self           = Self(30057);
    pub const SCROLL_VERTICALLY_SCROLLABLE: Self             = Self(30058);
    pub const SELECTION_SELECTION: Self                      = Self(30059);
    pub const SELECTION_CAN_SELECT_MULTIPLE: Self            = Self(30060);
    pub const SELECTION_IS_SELECTION_REQUIRED: Self          = Self(30061);
    pub const GRID_ROW_COUNT: Self                           = Self(30062);
    pub const GRID_COLUMN_COUNT: Self                        = Self(30063);
    pub const GRID_ITEM_ROW: Self                            = Self(30064);
    pub const GRID_ITEM_COLUMN: Self                         = Self(30065);
    pub const GRID_ITEM_ROW_SPAN: Self                       = Self(30066);
    pub const GRID_ITEM_COLUMN_SPAN: Self                    = Self(30067);
    pub const GRID_ITEM_CONTAINING_GRID: Self                = Self(30068);
    pub const DOCK_DOCK_POSITION: Self                       = Self(30069);
    pub const EXPAND_COLLAPSE_EXPAND_COLLAPSE_STATE: Self    = Self(30070);
    pub const MULTIPLE_VIEW_CURRENT_VIEW: Self               = Self(30071);
    pub const MULTIPLE_VIEW_SUPPORTED_VIEWS: Self            = Self(30072);
    pub const WINDOW_CAN_MAXIMIZE: Self                      = Self(30073);
    pub const WINDOW_CAN_MINIMIZE: Self                      = Self(30074);
    pub const WINDOW_WINDOW_VISUAL_STATE: Self               = Self(30075);
    pub const WINDOW_WINDOW_INTERACTION_STATE: Self          = Self(30076);
    pub const WINDOW_IS_MODAL: Self                          = Self(30077);
    pub const WINDOW_IS_TOPMOST: Self                        = Self(30078);
    pub const SELECTION_ITEM_IS_SELECTED: Self               = Self(30079);
    pub const SELECTION_ITEM_SELECTION_CONTAINER: Self       = Self(30080);
    pub const TABLE_ROW_HEADERS: Self                        = Self(30081);
    pub const TABLE_COLUMN_HEADERS: Self                     = Self(30082);
    pub const TABLE_ROW_OR_COLUMN_MAJOR: Self                = Self(30083);
    pub const TABLE_ITEM_ROW_HEADER_ITEMS: Self              = Self(30084);
    pub const TABLE_ITEM_COLUMN_HEADER_ITEMS: Self           = Self(30085);
    pub const TOGGLE_TOGGLE_STATE: Self                      = Self(30086);
    pub const TRANSFORM_CAN_MOVE: Self                       = Self(30087);
    pub const TRANSFORM_CAN_RESIZE: Self                     = Self(30088);
    pub const TRANSFORM_CAN_ROTATE: Self                     = Self(30089);
    pub const IS_LEGACY_I_ACCESSIBLE_PATTERN_AVAILABLE: Self = Self(30090);
    pub const LEGACY_I_ACCESSIBLE_CHILD_ID: Self             = Self(30091);
    pub const LEGACY_I_ACCESSIBLE_NAME: Self                 = Self(30092);
    pub const LEGACY_I_ACCESSIBLE_VALUE: Self                = Self(30093);
    pub const LEGACY_I_ACCESSIBLE_DESCRIPTION: Self          = Self(30094);
    pub const LEGACY_I_ACCESSIBLE_ROLE: Self                 = Self(30095);
    pub const LEGACY_I_ACCESSIBLE_STATE: Self                = Self(30096);
    pub const LEGACY_I_ACCESSIBLE_HELP: Self                 = Self(30097);
    pub const LEGACY_I_ACCESSIBLE_KEYBOARD_SHORTCUT: Self    = Self(30098);
    pub const LEGACY_I_ACCESSIBLE_SELECTION: Self            = Self(30099);
    pub const LEGACY_I_ACCESSIBLE_DEFAULT_ACTION: Self       = Self(30100);
    pub const ARIA_ROLE: Self                                = Self(30101);
    pub const ARIA_PROPERTIES: Self                          = Self(30102);
    pub const IS_DATA_VALID_FOR_FORM: Self                   = Self(30103);
    pub const CONTROLLER_FOR: Self                           = Self(30104);
    pub const DESCRIBED_BY: Self                             = Self(30105);
    pub const FLOWS_TO: Self                                 = Self(30106);
    pub const PROVIDER_DESCRIPTION: Self                     = Self(30107);
    pub const IS_ITEM_CONTAINER_PATTERN_AVAILABLE: Self      = Self(30108);
    pub const IS_VIRTUALIZED_ITEM_PATTERN_AVAILABLE: Self    = Self(30109);
    pub const IS_SYNCHRONIZED_INPUT_PATTERN_AVAILABLE: Self  = Self(30110);
    pub const OPTIMIZE_FOR_VISUAL_CONTENT: Self              = Self(30111);
    pub const IS_OBJECT_MODEL_PATTERN_AVAILABLE: Self        = Self(30112);
    pub const ANNOTATION_ANNOTATION_TYPE_ID: Self            = Self(30113);
    pub const ANNOTATION_ANNOTATION_TYPE_NAME: Self          = Self(30114);
    pub const ANNOTATION_AUTHOR: Self                        = Self(30115);
    pub const ANNOTATION_DATE_TIME: Self                     = Self(30116);
    pub const ANNOTATION_TARGET: Self                        = Self(30117);
    pub const IS_ANNOTATION_PATTERN_AVAILABLE: Self          = Self(30118);
    pub const IS_TEXT_PATTERN2_AVAILABLE: Self               = Self(30119);
    pub const STYLES_STYLE_ID: Self                          = Self(30120);
    pub const STYLES_STYLE_NAME: Self                        = Self(30121);
    pub const STYLES_FILL_COLOR: Self                        = Self(30122);
    pub const STYLES_FILL_PATTERN_STYLE: Self                = Self(30123);
    pub const STYLES_SHAPE: Self                             = Self(30124);
    pub const STYLES_FILL_PATTERN_COLOR: Self                = Self(30125);
    pub const STYLES_EXTENDED_PROPERTIES: Self               = Self(30126);
    pub const IS_STYLES_PATTERN_AVAILABLE: Self              = Self(30127);
    pub const IS_SPREADSHEET_PATTERN_AVAILABLE: Self         = Self(30128);
    pub const SPREADSHEET_ITEM_FORMULA: Self                 = Self(30129);
    pub const SPREADSHEET_ITEM_ANNOTATION_OBJECTS: Self      = Self(30130);
    pub const SPREADSHEET_ITEM_ANNOTATION_TYPES: Self        = Self(30131);
    pub const IS_SPREADSHEET_ITEM_PATTERN_AVAILABLE: Self    = Self(30132);
    pub const TRANSFORM2_CAN_ZOOM: Self                      = Self(30133);
    pub const IS_TRANSFORM_PATTERN2_AVAILABLE: Self          = Self(30134);
    pub const LIVE_SETTING: Self                             = Self(30135);
    pub const IS_TEXT_CHILD_PATTERN_AVAILABLE: Self          = Self(30136);
    pub const IS_DRAG_PATTERN_AVAILABLE: Self                = Self(30137);
    pub const DRAG_IS_GRABBED: Self                          = Self(30138);
    pub const DRAG_DROP_EFFECT: Self                         = Self(30139);
    pub const DRAG_DROP_EFFECTS: Self                        = Self(30140);
    pub const IS_DROP_TARGET_PATTERN_AVAILABLE: Self         = Self(30141);
    pub const DROP_TARGET_DROP_TARGET_EFFECT: Self           = Self(30142);
    pub const DROP_TARGET_DROP_TARGET_EFFECTS: Self          = Self(30143);
    pub const DRAG_GRABBED_ITEMS: Self                       = Self(30144);
    pub const TRANSFORM2_ZOOM_LEVEL: Self                    = Self(30145);
    pub const TRANSFORM2_ZOOM_MINIMUM: Self                  = Self(30146);
    pub const TRANSFORM2_ZOOM_MAXIMUM: Self                  = Self(30147);
    pub const FLOWS_FROM: Self                               = Self(30148);
    pub const IS_TEXT_EDIT_PATTERN_AVAILABLE: Self           = Self(30149);
    pub const IS_PERIPHERAL: Self                            = Self(30150);
    pub const IS_CUSTOM_NAVIGATION_PATTERN_AVAILABLE: Self   = Self(30151);
    pub const POSITION_IN_SET: Self                          = Self(30152);
    pub const SIZE_OF_SET: Self                              = Self(30153);
    pub const LEVEL: Self                                    = Self(30154);
    pub const ANNOTATION_TYPES: Self                         = Self(30155);
    pub const ANNOTATION_OBJECTS: Self                       = Self(30156);
    pub const LANDMARK_TYPE: Self                            = Self(30157);
    pub const LOCALIZED_LANDMARK_TYPE: Self                  = Self(30158);
    pub const FULL_DESCRIPTION: Self                         = Self(30159);
    pub const FILL_COLOR: Self                               = Self(30160);
    pub const OUTLINE_COLOR: Self                            = Self(30161);
    pub const FILL_TYPE: Self                                = Self(30162);
    pub const VISUAL_EFFECTS: Self                           = Self(30163);
    pub const OUTLINE_THICKNESS: Self                        = Self(30164);
    pub const CENTER_POINT: Self                             = Self(30165);
    pub const ROTATION: Self                                 = Self(30166);
    pub const SIZE: Self                                     = Self(30167);
    pub const IS_SELECTION_PATTERN2_AVAILABLE: Self          = Self(30168);
    pub const SELECTION2_FIRST_SELECTED_ITEM: Self           = Self(30169);
    pub const SELECTION2_LAST_SELECTED_ITEM: Self            = Self(30170);
    pub const SELECTION2_CURRENT_SELECTED_ITEM: Self         = Self(30171);
    pub const SELECTION2_ITEM_COUNT: Self                    = Self(30172);
    pub const HEADING_LEVEL: Self                            = Self(30173);
    pub const IS_DIALOG: Self                                = Self(30174);
}

#[rustfmt::skip]
impl ControlTypeId {
    pub const BUTTON: Self        = Self(50000);
    pub const CALENDAR: Self      = Self(50001);
    pub const CHECK_BOX: Self     = Self(50002);
    pub const COMBO_BOX: Self     = Self(50003);
    pub const EDIT: Self          = Self(50004);
    pub const HYPERLINK: Self     = Self(50005);
    pub const IMAGE: Self         = Self(50006);
    pub const LIST_ITEM: Self     = Self(50007);
    pub const LIST: Self          = Self(50008);
    pub const MENU: Self          = Self(50009);
    pub const MENU_BAR: Self      = Self(50010);
    pub const MENU_ITEM: Self     = Self(50011);
    pub const PROGRESS_BAR: Self  = Self(50012);
    pub const RADIO_BUTTON: Self  = Self(50013);
    pub const SCROLL_BAR: Self    = Self(50014);
    pub const SLIDER: Self        = Self(50015);
    pub const SPINNER: Self       = Self(50016);
    pub const STATUS_BAR: Self    = Self(50017);
    pub const TAB: Self           = Self(50018);
    pub const TAB_ITEM: Self      = Self(50019);
    pub const TEXT: Self          = Self(50020);
    pub const TOOL_BAR: Self      = Self(50021);
    pub const TOOL_TIP: Self      = Self(50022);
    pub const TREE: Self          = Self(50023);
    pub const TREE_ITEM: Self     = Self(50024);
    pub const CUSTOM: Self        = Self(50025);
    pub const GROUP: Self         = Self(50026);
    pub const THUMB: Self         = Self(50027);
    pub const DATA_GRID: Self     = Self(50028);
    pub const DATA_ITEM: Self     = Self(50029);
    pub const DOCUMENT: Self      = Self(50030);
    pub const SPLIT_BUTTON: Self  = Self(50031);
    pub const WINDOW: Self        = Self(50032);
    pub const PANE: Self          = Self(50033);
    pub const HEADER: Self        = Self(50034);
    pub const HEADER_ITEM: Self   = Self(50035);
    pub const TABLE: Self         = Self(50036);
    pub const TITLE_BAR: Self     = Self(50037);
    pub const SEPARATOR: Self     = Self(50038);
    pub const SEMANTIC_ZOOM: Self = Self(50039);
    pub const APP_BAR: Self       = Self(50040);
}

#[rustfmt::skip]
impl EventId {
    pub const TOOL_TIP_OPENED: Self                               = Self(20000);
    pub const TOOL_TIP_CLOSED: Self                               = Self(20001);
    pub const STRUCTURE_CHANGED: Self                             = Self(20002);
    pub const MENU_OPENED: Self                                   = Self(20003);
    pub const AUTOMATION_PROPERTY_CHANGED: Self                   = Self(20004);
    pub const AUTOMATION_FOCUS_CHANGED: Self                      = Self(20005);
    pub const ASYNC_CONTENT_LOADED: Self                          = Self(20006);
    pub const MENU_CLOSED: Self                                   = Self(20007);
    pub const LAYOUT_INVALIDATED: Self                            = Self(20008);
    pub const INVOKE_INVOKED: Self                                = Self(20009);
    pub const SELECTION_ITEM_ELEMENT_ADDED_TO_SELECTION: Self     = Self(20010);
    pub const SELECTION_ITEM_ELEMENT_REMOVED_FROM_SELECTION: Self = Self(20011);
    pub const SELECTION_ITEM_ELEMENT_SELECTED: Self               = Self(20012);
    pub const SELECTION_INVALIDATED: Self                         = Self(20013);
    pub const TEXT_TEXT_SELECTION_CHANGED: Self                   = Self(20014);
    pub const TEXT_TEXT_CHANGED: Self                             = Self(20015);
    pub const WINDOW_WINDOW_OPENED: Self                          = Self(20016);
    pub const WINDOW_WINDOW_CLOSED: Self                          = Self(20017);
    pub const MENU_MODE_START: Self                               = Self(20018);
    pub const MENU_MODE_END: Self                                 = Self(20019);
    pub const INPUT_REACHED_TARGET: Self                          = Self(20020);
    pub const INPUT_REACHED_OTHER_ELEMENT: Self                   = Self(20021);
    pub const INPUT_DISCARDED: Self                               = Self(20022);
    pub const SYSTEM_ALERT: Self                                  = Self(20023);
    pub const LIVE_REGION_CHANGED: Self                           = Self(20024);
    pub const HOSTED_FRAGMENT_ROOTS_INVALIDATED: Self             = Self(20025);
    pub const DRAG_DRAG_START: Self                               = Self(20026);
    pub const DRAG_DRAG_CANCEL: Self                              = Self(20027);
    pub const DRAG_DRAG_COMPLETE: Self                            = Self(20028);
    pub const DROP_TARGET_DRAG_ENTER: Self                        = Self(20029);
    pub const DROP_TARGET_DRAG_LEAVE: Self                        = Self(20030);
    pub const DROP_TARGET_DROPPED: Self                           = Self(20031);
    pub const TEXT_EDIT_TEXT_CHANGED: Self                        = Self(20032);
    pub const TEXT_EDIT_CONVERSION_TARGET_CHANGED: Self           = Self(20033);
    pub const CHANGES: Self                                       = Self(20034);
    pub const NOTIFICATION: Self                                  = Self(20035);
    pub const ACTIVE_TEXT_POSITION_CHANGED: Self                  = Self(20036);
}

/// How the tree structure around an element changed.
#[repr(u32)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StructureChangeType {
    ChildAdded = 0,
    ChildRemoved = 1,
    ChildrenInvalidated = 2,
    ChildrenBulkAdded = 3,
    ChildrenBulkRemoved = 4,
    ChildrenReordered = 5,
}

/// Direction of a fragment tree navigation request.
#[repr(u32)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NavigateDirection {
    Parent = 0,
    NextSibling = 1,
    PreviousSibling = 2,
    FirstChild = 3,
    LastChild = 4,
}

impl NavigateDirection {
    /// Project a raw boundary value back into the enum.
    pub fn from_raw(raw: u32) -> Option<Self> {
        Some(match raw {
            0 => Self::Parent,
            1 => Self::NextSibling,
            2 => Self::PreviousSibling,
            3 => Self::FirstChild,
            4 => Self::LastChild,
            _ => return None,
        })
    }
}

/// What an out-of-band notification reports.
#[repr(u32)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NotificationKind {
    ItemAdded = 0,
    ItemRemoved = 1,
    ActionCompleted = 2,
    ActionAborted = 3,
    Other = 4,
}

/// How the client should coalesce rapid repeated notifications.
///
/// Advisory to the client, not enforced by the emitter.
#[repr(u32)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NotificationProcessing {
    ImportantAll = 0,
    ImportantMostRecent = 1,
    All = 2,
    MostRecent = 3,
    CurrentThenMostRecent = 4,
}

/// Requested scroll step for one axis.
#[repr(u32)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ScrollAmount {
    LargeDecrement = 0,
    SmallDecrement = 1,
    NoAmount = 2,
    LargeIncrement = 3,
    SmallIncrement = 4,
}

impl ScrollAmount {
    /// Project a raw boundary value back into the enum.
    pub fn from_raw(raw: u32) -> Option<Self> {
        Some(match raw {
            0 => Self::LargeDecrement,
            1 => Self::SmallDecrement,
            2 => Self::NoAmount,
            3 => Self::LargeIncrement,
            4 => Self::SmallIncrement,
            _ => return None,
        })
    }
}

/// State reported by the toggle capability.
#[repr(u32)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ToggleState {
    Off = 0,
    On = 1,
    Indeterminate = 2,
}

/// Provider behavior flags reported through the simple capability.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ProviderOptions(pub u32);

#[rustfmt::skip]
impl ProviderOptions {
    pub const CLIENT_SIDE_PROVIDER: Self      = Self(0x001);
    pub const SERVER_SIDE_PROVIDER: Self      = Self(0x002);
    pub const NON_CLIENT_AREA_PROVIDER: Self  = Self(0x004);
    pub const OVERRIDE_PROVIDER: Self         = Self(0x008);
    pub const PROVIDER_OWNS_SET_FOCUS: Self   = Self(0x010);
    pub const USE_COM_THREADING: Self         = Self(0x020);
    pub const REFUSE_NON_CLIENT_SUPPORT: Self = Self(0x040);
    pub const HAS_NATIVE_I_ACCESSIBLE: Self   = Self(0x080);
    pub const USE_CLIENT_COORDINATES: Self    = Self(0x100);

    /// Whether every flag in `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ProviderOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ProviderOptions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// An element's bounding rectangle in screen coordinates, as the platform
/// lays it out.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct UiaRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

static_assertions::const_assert_eq!(std::mem::size_of::<UiaRect>(), 32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn published_id_values() {
        // Spot checks against the platform headers; these are wire values.
        assert_eq!(PatternId::INVOKE.0, 10000);
        assert_eq!(PatternId::VALUE.0, 10002);
        assert_eq!(PatternId::SCROLL.0, 10004);
        assert_eq!(PatternId::TOGGLE.0, 10015);
        assert_eq!(PropertyId::NAME.0, 30005);
        assert_eq!(PropertyId::TOGGLE_TOGGLE_STATE.0, 30086);
        assert_eq!(PropertyId::IS_DIALOG.0, 30174);
        assert_eq!(ControlTypeId::BUTTON.0, 50000);
        assert_eq!(ControlTypeId::APP_BAR.0, 50040);
        assert_eq!(EventId::STRUCTURE_CHANGED.0, 20002);
        assert_eq!(EventId::NOTIFICATION.0, 20035);
        assert_eq!(EventId::ACTIVE_TEXT_POSITION_CHANGED.0, 20036);
    }

    #[test]
    fn closed_enum_values() {
        assert_eq!(StructureChangeType::ChildrenReordered as u32, 5);
        assert_eq!(NavigateDirection::LastChild as u32, 4);
        assert_eq!(NavigateDirection::from_raw(3), Some(NavigateDirection::FirstChild));
        assert_eq!(NavigateDirection::from_raw(9), None);
        assert_eq!(NotificationKind::Other as u32, 4);
        assert_eq!(NotificationProcessing::CurrentThenMostRecent as u32, 4);
        assert_eq!(ScrollAmount::SmallIncrement as u32, 4);
        assert_eq!(ToggleState::Indeterminate as u32, 2);
    }

    #[test]
    fn provider_options_compose() {
        let opts = ProviderOptions::SERVER_SIDE_PROVIDER | ProviderOptions::USE_COM_THREADING;
        assert_eq!(opts.0, 0x22);
        assert!(opts.contains(ProviderOptions::SERVER_SIDE_PROVIDER));
        assert!(!opts.contains(ProviderOptions::OVERRIDE_PROVIDER));
    }
}
