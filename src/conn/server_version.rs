use crate::hdb_error::usage_err;
use crate::HdbResult;

/// The version of the database server, parsed from the version string
/// that the server reports during the connect, e.g. `4.00.000.00.1234`.
///
/// The string form is `<major>.<minor>.<revision>.<patch>[.<build_id>]`
/// with fixed widths for the middle components; parsing and formatting
/// are inverse to each other.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct ServerVersion {
    major: u32,
    minor: u32,
    revision: u32,
    patch: u32,
    o_build_id: Option<u64>,
}

impl ServerVersion {
    /// Major version number.
    pub fn major(&self) -> u32 {
        self.major
    }
    /// Minor version number.
    pub fn minor(&self) -> u32 {
        self.minor
    }
    /// Revision number.
    pub fn revision(&self) -> u32 {
        self.revision
    }
    /// Patch number.
    pub fn patch(&self) -> u32 {
        self.patch
    }
    /// Build id, if the server reports one.
    pub fn build_id(&self) -> Option<u64> {
        self.o_build_id
    }

    pub(crate) fn parse(s: &str) -> HdbResult<Self> {
        let mut elements = s.split('.');
        let mut next_number = |name: &'static str| {
            elements
                .next()
                .and_then(|part| part.parse::<u32>().ok())
                .ok_or_else(|| usage_err!("version string lacks a valid {name}"))
        };
        let major = next_number("major number")?;
        let minor = next_number("minor number")?;
        let revision = next_number("revision number")?;
        let patch = next_number("patch number")?;
        let o_build_id = match elements.next() {
            None => None,
            Some(part) => Some(
                part.parse::<u64>()
                    .map_err(|_| usage_err!("version string has an invalid build id"))?,
            ),
        };
        if elements.next().is_some() {
            return Err(usage_err!("version string has too many components"));
        }
        Ok(Self {
            major,
            minor,
            revision,
            patch,
            o_build_id,
        })
    }
}

impl std::fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}.{:02}.{:03}.{:02}",
            self.major, self.minor, self.revision, self.patch
        )?;
        if let Some(build_id) = self.o_build_id {
            write!(f, ".{build_id}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ServerVersion;

    #[test]
    fn parse_format_round_trip() {
        for s in [
            "4.00.000.00.1598778947",
            "2.00.045.00",
            "4.50.024.07.123",
            "1.00.000.00",
        ] {
            let version = ServerVersion::parse(s).unwrap();
            assert_eq!(version.to_string(), s);
        }
    }

    #[test]
    fn components_are_accessible() {
        let version = ServerVersion::parse("4.00.048.21.977").unwrap();
        assert_eq!(version.major(), 4);
        assert_eq!(version.minor(), 0);
        assert_eq!(version.revision(), 48);
        assert_eq!(version.patch(), 21);
        assert_eq!(version.build_id(), Some(977));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(ServerVersion::parse("").is_err());
        assert!(ServerVersion::parse("4.00").is_err());
        assert!(ServerVersion::parse("4.00.000.xx").is_err());
        assert!(ServerVersion::parse("4.00.000.00.1.2").is_err());
    }
}
