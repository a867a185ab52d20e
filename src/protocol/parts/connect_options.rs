use crate::protocol::parts::{
    option_part::{OptionId, OptionPart},
    option_value::OptionValue,
};
use crate::HdbResult;

// ConnectOptions are seeded by the application (`ConnectOptions::Initial`),
// augmented by the implementation and sent to the server (`for_server()`),
// and finalized based on the response from the server
// (`digest_server_connect_options()`, which switches to variant `Final`).
#[derive(Clone, Debug)]
pub(crate) enum ConnectOptions {
    Initial {
        os_user: String,
        o_client_locale: Option<String>,
    },
    Final {
        os_user: String,
        o_client_locale: Option<String>,

        client_reconnect_wait_timeout: std::time::Duration,
        dataformat_version2: u8,

        connection_id: u32,
        system_id: String,
        database_name: String,
        full_version: String,
        implicit_lob_streaming: bool,
    },
}
impl ConnectOptions {
    // Hard-coded defaults
    const CLIENT_RECONNECT_WAIT_TIMEOUT_IN_SECONDS: u32 = 600; // server does not allow more
    const DATAFORMAT_VERSION2: u8 = 8;

    // The data format versions this client can decode.
    const SUPPORTED_DATAFORMAT_VERSIONS: [u8; 4] = [1, 4, 6, 8];

    pub(crate) fn new(o_client_locale: Option<&str>, os_user: &str) -> Self {
        ConnectOptions::Initial {
            o_client_locale: o_client_locale.map(ToString::to_string),
            os_user: os_user.to_string(),
        }
    }

    pub(crate) fn for_server(&self) -> ConnectOptionsPart {
        let (o_client_locale, os_user, o_connection_id) = match self {
            ConnectOptions::Initial {
                o_client_locale,
                os_user,
            } => (o_client_locale, os_user, None),
            ConnectOptions::Final {
                o_client_locale,
                os_user,
                connection_id,
                ..
            } => (o_client_locale, os_user, Some(connection_id)),
        };

        let mut connopts_part = ConnectOptionsPart::default();
        let mut set_opt = |id: ConnOptId, value: OptionValue| {
            debug!("Sending ConnectionOption to server: {id:?} = {value:?}");
            connopts_part.insert(id, value);
        };

        if let Some(connection_id) = o_connection_id {
            set_opt(
                ConnOptId::ConnectionID,
                OptionValue::INT(i32::try_from(*connection_id).unwrap_or(0)),
            );
        }

        set_opt(
            ConnOptId::ClientReconnectWaitTimeout,
            OptionValue::INT(
                i32::try_from(Self::CLIENT_RECONNECT_WAIT_TIMEOUT_IN_SECONDS).unwrap_or(600),
            ),
        );

        set_opt(
            ConnOptId::DataFormatVersion2,
            OptionValue::INT(i32::from(Self::DATAFORMAT_VERSION2)),
        );
        set_opt(ConnOptId::OSUser, OptionValue::STRING(os_user.clone()));
        set_opt(ConnOptId::ClientDistributionMode, OptionValue::INT(0));

        if let Some(client_locale) = o_client_locale {
            set_opt(
                ConnOptId::ClientLocale,
                OptionValue::STRING(client_locale.clone()),
            );
        }

        connopts_part
    }

    pub(crate) fn digest_server_connect_options(
        &mut self,
        incoming: ConnectOptionsPart,
    ) -> HdbResult<()> {
        let (o_client_locale, os_user) = match *self {
            ConnectOptions::Initial {
                ref o_client_locale,
                ref os_user,
            }
            | ConnectOptions::Final {
                // necessary for reconnects
                ref o_client_locale,
                ref os_user,
                ..
            } => (o_client_locale.clone(), os_user.clone()),
        };
        let mut client_reconnect_wait_timeout = std::time::Duration::from_secs(u64::from(
            Self::CLIENT_RECONNECT_WAIT_TIMEOUT_IN_SECONDS,
        ));
        let mut dataformat_version2 = Self::DATAFORMAT_VERSION2;

        let mut connection_id = 0;
        let mut system_id = String::default();
        let mut database_name = String::default();
        let mut full_version = String::default();
        let mut implicit_lob_streaming = false;

        for (k, v) in incoming {
            match k {
                ConnOptId::ClientReconnectWaitTimeout => {
                    client_reconnect_wait_timeout =
                        std::time::Duration::from_secs(u64::try_from(v.get_int_as_i32()?).unwrap_or(0));
                }
                ConnOptId::DataFormatVersion2 => {
                    let server_level = u8::try_from(v.get_int_as_i32()?).unwrap_or(0);
                    // step down to the highest supported level
                    dataformat_version2 = Self::SUPPORTED_DATAFORMAT_VERSIONS
                        .iter()
                        .rev()
                        .find(|l| **l <= server_level)
                        .copied()
                        .unwrap_or(1);
                }

                ConnOptId::ConnectionID => {
                    connection_id = v.get_int_as_u32()?;
                }
                ConnOptId::SystemID => {
                    system_id = v.into_string()?;
                }
                ConnOptId::DatabaseName => {
                    database_name = v.into_string()?;
                }
                ConnOptId::FullVersionString => {
                    full_version = v.into_string()?;
                }
                ConnOptId::ImplicitLobStreaming => {
                    implicit_lob_streaming = v.get_bool()?;
                }

                ConnOptId::BuildPlatform
                | ConnOptId::Endianness
                | ConnOptId::EngineDataFormatVersion
                | ConnOptId::DataFormatVersion
                | ConnOptId::NonTransactionalPrepare
                | ConnOptId::SupportsLargeBulkOperations
                | ConnOptId::ActiveActiveProtocolVersion
                | ConnOptId::CompleteArrayExecution
                | ConnOptId::QueryTimeoutOK
                | ConnOptId::UseTransactionFlagsOnly
                | ConnOptId::IgnoreUnknownParts
                | ConnOptId::SplitBatchCommands
                | ConnOptId::FdaEnabled
                | ConnOptId::ItabParameter
                | ConnOptId::ClientDistributionMode
                | ConnOptId::ClientInfoNullValueOK
                | ConnOptId::FlagSet1 => {
                    debug!("Got from server ConnectionOption: {k:?} = {v:?}");
                }
                k => {
                    warn!("Unexpected ConnectOption coming from server ({k:?})");
                }
            }
        }

        *self = ConnectOptions::Final {
            os_user,
            o_client_locale,
            client_reconnect_wait_timeout,
            dataformat_version2,
            connection_id,
            system_id,
            database_name,
            full_version,
            implicit_lob_streaming,
        };
        Ok(())
    }

    // The connection ID is filled by the server when the connection is
    // established. It can be used in DISCONNECT/KILL commands for command
    // or session cancellation.
    pub(crate) fn connection_id(&self) -> u32 {
        match &self {
            ConnectOptions::Initial { .. } => 0,
            ConnectOptions::Final { connection_id, .. } => *connection_id,
        }
    }

    // The SystemID is set by the server with the name of the connected
    // instance, for tracing and supportability.
    pub(crate) fn system_id(&self) -> &str {
        match &self {
            ConnectOptions::Initial { .. } => "",
            ConnectOptions::Final { system_id, .. } => system_id,
        }
    }

    pub(crate) fn database_name(&self) -> &str {
        match &self {
            ConnectOptions::Initial { .. } => "",
            ConnectOptions::Final { database_name, .. } => database_name,
        }
    }

    pub(crate) fn full_version_string(&self) -> &str {
        match &self {
            ConnectOptions::Initial { .. } => "",
            ConnectOptions::Final { full_version, .. } => full_version,
        }
    }

    // The negotiated data format version; the client sends the set of
    // understood typecodes and field formats, the server answers with the
    // level it will use.
    pub(crate) fn dataformat_version2(&self) -> u8 {
        match &self {
            ConnectOptions::Initial { .. } => Self::DATAFORMAT_VERSION2,
            ConnectOptions::Final {
                dataformat_version2,
                ..
            } => *dataformat_version2,
        }
    }

    // Is set by the server to indicate that it supports implicit LOB
    // streaming even though auto-commit is on, instead of raising an error.
    pub(crate) fn implicit_lob_streaming(&self) -> bool {
        match &self {
            ConnectOptions::Initial { .. } => false,
            ConnectOptions::Final {
                implicit_lob_streaming,
                ..
            } => *implicit_lob_streaming,
        }
    }
}

// An Options part that describes the connection's capabilities on the wire.
// It is used during authentication only, both in requests and replies.
pub(crate) type ConnectOptionsPart = OptionPart<ConnOptId>;

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[rustfmt::skip]
pub(crate) enum ConnOptId {
    ConnectionID,                 //  1 //
    CompleteArrayExecution,       //  2 // @deprecated Array execution semantics, always true.
    ClientLocale,                 //  3 // Is used within the calculation engine.
    SupportsLargeBulkOperations,  //  4 // Bulk operations >32K are supported.
    DistributionEnabled,          //  5 // @deprecated Distribution enabled
    PrimaryConnectionId,          //  6 // @deprecated Id of primary connection (unused)
    PrimaryConnectionHost,        //  7 // @deprecated Primary connection host name (unused)
    PrimaryConnectionPort,        //  8 // @deprecated Primary connection port (unused)
    CompleteDatatypeSupport,      //  9 // @deprecated All data types supported (always on)
    LargeNumberOfParametersOK,    // 10 // Number of parameters >32K is supported.
    SystemID,                     // 11 // SID of the database system (output only).
    DataFormatVersion,            // 12 // Superseded by DataFormatVersion2 (23)
    AbapVarcharMode,              // 13 // ABAP varchar mode (trim trailing blanks)
    SelectForUpdateOK,            // 14 // SELECT FOR UPDATE function code understood
    ClientDistributionMode,       // 15 // client distribution mode
    EngineDataFormatVersion,      // 16 // Engine version of data format
    DistributionProtocolVersion,  // 17 // version of distribution protocol handling
    SplitBatchCommands,           // 18 // permit splitting of batch commands
    UseTransactionFlagsOnly,      // 19 // use transaction flags only
    RowSlotImageParameter,        // 20 // row-slot image parameter passing
    IgnoreUnknownParts,           // 21 // server does not abort on unknown parts
    TableOutputParMetadataOK,     // 22 // support table type output parameter metadata
    DataFormatVersion2,           // 23 // Version of data format
    ItabParameter,                // 24 // bool option to signal abap itab parameter support
    DescribeTableOutputParameter, // 25 // overrides "omit table output parameter"
    ColumnarResultSet,            // 26 // column wise result passing
    ScrollableResultSet,          // 27 // scrollable result set
    ClientInfoNullValueOK,        // 28 // can handle null values in client info
    AssociatedConnectionID,       // 29 // associated connection id
    NonTransactionalPrepare,      // 30 // can handle and uses non-transactional prepare
    FdaEnabled,                   // 31 // Fast Data Access at all enabled
    OSUser,                       // 32 // client OS user name
    RowSlotImageResultSet,        // 33 // row-slot image result passing
    Endianness,                   // 34 // endianness
    UpdateTopologyAnwhere,        // 35 // Allow update of topology from any reply
    EnableArrayType,              // 36 // Enable supporting Array data type
    ImplicitLobStreaming,         // 37 // implicit lob streaming
    CachedViewProperty,           // 38 //
    XOpenXAProtocolOK,            // 39 //
    MasterCommitRedirectionOK,    // 40 //
    ActiveActiveProtocolVersion,  // 41 //
    ActiveActiveConnOriginSite,   // 42 //
    QueryTimeoutOK,               // 43 //
    FullVersionString,            // 44 //
    DatabaseName,                 // 45 //
    BuildPlatform,                // 46 //
    ImplicitXASessionOK,          // 47 //
    ClientSideColumnEncryptionVersion, // 48 // Version of client-side column encryption
    CompressionLevelAndFlags,     // 49 // Network compression level and flags
    ClientSideReExecutionSupported, // 50 //
    ClientReconnectWaitTimeout,   // 51 // Wait timeout for client reconnects
    OriginalAnchorConnectionID,   // 52 // anchor connection id of the first connection
    FlagSet1,                     // 53 // flags
    TopologyNetworkGroup,         // 54 // NetworkGroup client setting
    IPAddress,                    // 55 // client side IP Address
    LRRPingTime,                  // 56 // Long running request ping time
    __Unexpected__(u8),
}

impl OptionId<ConnOptId> for ConnOptId {
    fn to_u8(&self) -> u8 {
        match *self {
            Self::ConnectionID => 1,
            Self::CompleteArrayExecution => 2,
            Self::ClientLocale => 3,
            Self::SupportsLargeBulkOperations => 4,
            Self::DistributionEnabled => 5,
            Self::PrimaryConnectionId => 6,
            Self::PrimaryConnectionHost => 7,
            Self::PrimaryConnectionPort => 8,
            Self::CompleteDatatypeSupport => 9,
            Self::LargeNumberOfParametersOK => 10,
            Self::SystemID => 11,
            Self::DataFormatVersion => 12,
            Self::AbapVarcharMode => 13,
            Self::SelectForUpdateOK => 14,
            Self::ClientDistributionMode => 15,
            Self::EngineDataFormatVersion => 16,
            Self::DistributionProtocolVersion => 17,
            Self::SplitBatchCommands => 18,
            Self::UseTransactionFlagsOnly => 19,
            Self::RowSlotImageParameter => 20,
            Self::IgnoreUnknownParts => 21,
            Self::TableOutputParMetadataOK => 22,
            Self::DataFormatVersion2 => 23,
            Self::ItabParameter => 24,
            Self::DescribeTableOutputParameter => 25,
            Self::ColumnarResultSet => 26,
            Self::ScrollableResultSet => 27,
            Self::ClientInfoNullValueOK => 28,
            Self::AssociatedConnectionID => 29,
            Self::NonTransactionalPrepare => 30,
            Self::FdaEnabled => 31,
            Self::OSUser => 32,
            Self::RowSlotImageResultSet => 33,
            Self::Endianness => 34,
            Self::UpdateTopologyAnwhere => 35,
            Self::EnableArrayType => 36,
            Self::ImplicitLobStreaming => 37,
            Self::CachedViewProperty => 38,
            Self::XOpenXAProtocolOK => 39,
            Self::MasterCommitRedirectionOK => 40,
            Self::ActiveActiveProtocolVersion => 41,
            Self::ActiveActiveConnOriginSite => 42,
            Self::QueryTimeoutOK => 43,
            Self::FullVersionString => 44,
            Self::DatabaseName => 45,
            Self::BuildPlatform => 46,
            Self::ImplicitXASessionOK => 47,
            Self::ClientSideColumnEncryptionVersion => 48,
            Self::CompressionLevelAndFlags => 49,
            Self::ClientSideReExecutionSupported => 50,
            Self::ClientReconnectWaitTimeout => 51,
            Self::OriginalAnchorConnectionID => 52,
            Self::FlagSet1 => 53,
            Self::TopologyNetworkGroup => 54,
            Self::IPAddress => 55,
            Self::LRRPingTime => 56,
            Self::__Unexpected__(n) => n,
        }
    }

    fn from_u8(val: u8) -> Self {
        match val {
            1 => Self::ConnectionID,
            2 => Self::CompleteArrayExecution,
            3 => Self::ClientLocale,
            4 => Self::SupportsLargeBulkOperations,
            5 => Self::DistributionEnabled,
            6 => Self::PrimaryConnectionId,
            7 => Self::PrimaryConnectionHost,
            8 => Self::PrimaryConnectionPort,
            9 => Self::CompleteDatatypeSupport,
            10 => Self::LargeNumberOfParametersOK,
            11 => Self::SystemID,
            12 => Self::DataFormatVersion,
            13 => Self::AbapVarcharMode,
            14 => Self::SelectForUpdateOK,
            15 => Self::ClientDistributionMode,
            16 => Self::EngineDataFormatVersion,
            17 => Self::DistributionProtocolVersion,
            18 => Self::SplitBatchCommands,
            19 => Self::UseTransactionFlagsOnly,
            20 => Self::RowSlotImageParameter,
            21 => Self::IgnoreUnknownParts,
            22 => Self::TableOutputParMetadataOK,
            23 => Self::DataFormatVersion2,
            24 => Self::ItabParameter,
            25 => Self::DescribeTableOutputParameter,
            26 => Self::ColumnarResultSet,
            27 => Self::ScrollableResultSet,
            28 => Self::ClientInfoNullValueOK,
            29 => Self::AssociatedConnectionID,
            30 => Self::NonTransactionalPrepare,
            31 => Self::FdaEnabled,
            32 => Self::OSUser,
            33 => Self::RowSlotImageResultSet,
            34 => Self::Endianness,
            35 => Self::UpdateTopologyAnwhere,
            36 => Self::EnableArrayType,
            37 => Self::ImplicitLobStreaming,
            38 => Self::CachedViewProperty,
            39 => Self::XOpenXAProtocolOK,
            40 => Self::MasterCommitRedirectionOK,
            41 => Self::ActiveActiveProtocolVersion,
            42 => Self::ActiveActiveConnOriginSite,
            43 => Self::QueryTimeoutOK,
            44 => Self::FullVersionString,
            45 => Self::DatabaseName,
            46 => Self::BuildPlatform,
            47 => Self::ImplicitXASessionOK,
            48 => Self::ClientSideColumnEncryptionVersion,
            49 => Self::CompressionLevelAndFlags,
            50 => Self::ClientSideReExecutionSupported,
            51 => Self::ClientReconnectWaitTimeout,
            52 => Self::OriginalAnchorConnectionID,
            53 => Self::FlagSet1,
            54 => Self::TopologyNetworkGroup,
            55 => Self::IPAddress,
            56 => Self::LRRPingTime,
            val => Self::__Unexpected__(val),
        }
    }

    fn part_type(&self) -> &'static str {
        "ConnectOptions"
    }
}
