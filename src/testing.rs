//! Test support shared by unit and integration tests.

/// Hand-assembled Ethernet frames.
pub mod frames {
    use std::net::SocketAddrV4;

    const SOURCE_MAC: [u8; 6] = [0x02, 0, 0, 0, 0, 1];
    const DESTINATION_MAC: [u8; 6] = [0x02, 0, 0, 0, 0, 2];
    const ETHERTYPE_IPV4: u16 = 0x0800;
    const ETHERTYPE_ARP: u16 = 0x0806;
    const PROTOCOL_TCP: u8 = 6;
    const PROTOCOL_UDP: u8 = 17;

    fn ethernet(ethertype: u16) -> Vec<u8> {
        let mut frame = Vec::with_capacity(64);
        frame.extend_from_slice(&DESTINATION_MAC);
        frame.extend_from_slice(&SOURCE_MAC);
        frame.extend_from_slice(&ethertype.to_be_bytes());
        frame
    }

    fn ipv4(
        protocol: u8,
        source: SocketAddrV4,
        destination: SocketAddrV4,
        transport_header: &[u8],
        payload: &[u8],
    ) -> Vec<u8> {
        let total_len = (20 + transport_header.len() + payload.len()) as u16;

        let mut frame = ethernet(ETHERTYPE_IPV4);
        frame.extend_from_slice(&[0x45, 0x00]); // version 4, IHL 5
        frame.extend_from_slice(&total_len.to_be_bytes());
        frame.extend_from_slice(&[0, 0, 0, 0]); // id, flags, fragment offset
        frame.extend_from_slice(&[64, protocol, 0, 0]); // ttl, protocol, checksum
        frame.extend_from_slice(&source.ip().octets());
        frame.extend_from_slice(&destination.ip().octets());
        frame.extend_from_slice(transport_header);
        frame.extend_from_slice(payload);
        frame
    }

    /// An Ethernet/IPv4/TCP frame carrying `payload`.
    pub fn tcp(source: SocketAddrV4, destination: SocketAddrV4, payload: &[u8]) -> Vec<u8> {
        let mut header = Vec::with_capacity(20);
        header.extend_from_slice(&source.port().to_be_bytes());
        header.extend_from_slice(&destination.port().to_be_bytes());
        header.extend_from_slice(&[0; 8]); // seq, ack
        header.extend_from_slice(&[0x50, 0x18]); // data offset 5, PSH|ACK
        header.extend_from_slice(&[0xff, 0xff, 0, 0, 0, 0]); // window, checksum, urgent

        ipv4(PROTOCOL_TCP, source, destination, &header, payload)
    }

    /// An Ethernet/IPv4/UDP frame carrying `payload`.
    pub fn udp(source: SocketAddrV4, destination: SocketAddrV4, payload: &[u8]) -> Vec<u8> {
        let len = (8 + payload.len()) as u16;

        let mut header = Vec::with_capacity(8);
        header.extend_from_slice(&source.port().to_be_bytes());
        header.extend_from_slice(&destination.port().to_be_bytes());
        header.extend_from_slice(&len.to_be_bytes());
        header.extend_from_slice(&[0, 0]);

        ipv4(PROTOCOL_UDP, source, destination, &header, payload)
    }

    /// A frame with a non-IPv4 ethertype.
    pub fn arp() -> Vec<u8> {
        let mut frame = ethernet(ETHERTYPE_ARP);
        frame.resize(42, 0);
        frame
    }
}
