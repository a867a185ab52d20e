use crate::conn::TcpClient;
use crate::protocol::util_sync;
use byteorder::{BigEndian, WriteBytesExt};
use std::io::Write;
use std::sync::OnceLock;

// The 14-byte prolog that opens every connection, sent before any message
// exchange, and the 8-byte response that is skipped over.
pub(crate) fn send_and_receive(tcp_client: &mut TcpClient) -> std::io::Result<()> {
    trace!("send_and_receive(): send");
    {
        let w = tcp_client.writer();
        w.write_all(initial_request())?;
        w.flush()?;
    }

    trace!("send_and_receive(): receive");
    util_sync::skip_bytes(8, tcp_client.reader()) // ignore the response content
        .map_err(|e| {
            trace!("Skipping over empty initial response failed with {e:?}");
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, e.to_string())
        })?;
    debug!("Successfully initialized");
    Ok(())
}

fn initial_request() -> &'static [u8] {
    static INITIAL_REQUEST: OnceLock<Box<[u8]>> = OnceLock::new();
    INITIAL_REQUEST.get_or_init(|| {
        const FILLER: i32 = -1;
        const MAJOR_PRODUCT_VERSION: i8 = 4;
        const MINOR_PRODUCT_VERSION: i16 = 20;
        const MAJOR_PROTOCOL_VERSION: i8 = 4;
        const MINOR_PROTOCOL_VERSION: i16 = 1;
        const RESERVED: i8 = 0;
        const NUMBER_OF_OPTIONS: i8 = 1;
        const OPTION_ID_SWAPKIND: i8 = 1;
        const LITTLE_ENDIAN: i8 = 1;

        let mut c = std::io::Cursor::new(vec![0_u8; 0]);
        Write::write_all(&mut c, &FILLER.to_be_bytes()).expect("vec");
        WriteBytesExt::write_i8(&mut c, MAJOR_PRODUCT_VERSION).expect("vec");
        WriteBytesExt::write_i16::<BigEndian>(&mut c, MINOR_PRODUCT_VERSION).expect("vec");
        WriteBytesExt::write_i8(&mut c, MAJOR_PROTOCOL_VERSION).expect("vec");
        WriteBytesExt::write_i16::<BigEndian>(&mut c, MINOR_PROTOCOL_VERSION).expect("vec");
        WriteBytesExt::write_i8(&mut c, RESERVED).expect("vec");
        WriteBytesExt::write_i8(&mut c, NUMBER_OF_OPTIONS).expect("vec");
        WriteBytesExt::write_i8(&mut c, OPTION_ID_SWAPKIND).expect("vec");
        WriteBytesExt::write_i8(&mut c, LITTLE_ENDIAN).expect("vec");
        let res = c.into_inner().into_boxed_slice();
        assert_eq!(res.len(), 14);
        res
    })
}

#[cfg(test)]
mod tests {
    #[test]
    fn prolog_is_fourteen_bytes() {
        let prolog = super::initial_request();
        assert_eq!(prolog.len(), 14);
        assert_eq!(&prolog[0..4], &[0xFF, 0xFF, 0xFF, 0xFF]); // filler
        assert_eq!(prolog[4], 4); // product major
        assert_eq!(&prolog[5..7], &[0, 20]); // product minor, big-endian
        assert_eq!(prolog[7], 4); // protocol major
        assert_eq!(&prolog[8..10], &[0, 1]); // protocol minor, big-endian
        assert_eq!(prolog[11], 1); // number of options
        assert_eq!(prolog[13], 1); // little-endian marker
    }
}
