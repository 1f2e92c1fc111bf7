#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A buffer (command, capture or payload) was too small for the data
    Overflow,

    /// The module sent nothing at all before the deadline
    NoResponse,

    /// The module sent data, but the expected token never appeared before the
    /// deadline
    UnexpectedResponse,

    /// A parameter was rejected before anything was sent to the module
    UnexpectedParam,

    /// The module is not registered with an operator
    Deregistered,

    /// Serial read error
    Read,

    /// Serial write error
    Write,
}
