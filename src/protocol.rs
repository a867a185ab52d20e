mod message_type;
mod part;
mod part_attributes;
mod partkind;
pub(crate) mod parts;
mod reply;
mod reply_type;
mod request;
pub(crate) mod util;
pub(crate) mod util_sync;

pub(crate) use self::{
    message_type::MessageType,
    part::Part,
    part_attributes::PartAttributes,
    partkind::PartKind,
    reply::Reply,
    reply_type::ReplyType,
    request::{Request, HOLD_CURSORS_OVER_COMMIT},
};
