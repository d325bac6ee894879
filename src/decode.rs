use clap::ValueEnum;
use pnet::packet::Packet;
use pnet::packet::ethernet::{EtherTypes, EthernetPacket};
use pnet::packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::ipv6::Ipv6Packet;
use pnet::packet::tcp::TcpPacket;
use pnet::packet::udp::UdpPacket;

/// How much work a single decode costs. Both strategies walk the same layers
/// and fold the same fields; only allocation and copy behavior differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DecodeStrategy {
    /// Zero-copy packet views over the capture buffer, one decoder reused
    /// across every packet and file.
    Reuse,
    /// A fresh owned copy of the bytes at every layer boundary, per decode.
    Full,
}

/// Decodes Ethernet / IPv4 / IPv6 / TCP / UDP headers from raw frames and
/// folds a few fields of each decoded layer into an accumulator, so the
/// decode work is observable and cannot be optimized out.
pub struct LayerDecoder {
    strategy: DecodeStrategy,
    touched: u64,
}

impl LayerDecoder {
    pub fn new(strategy: DecodeStrategy) -> Self {
        Self {
            strategy,
            touched: 0,
        }
    }

    /// Decode one frame. Returns false only when the Ethernet layer itself
    /// cannot be parsed; unknown inner layers are skipped, not errors.
    pub fn decode(&mut self, frame: &[u8]) -> bool {
        match self.strategy {
            DecodeStrategy::Reuse => self.decode_borrowed(frame),
            DecodeStrategy::Full => self.decode_owned(frame),
        }
    }

    /// Accumulator over every field touched so far. Strategy-independent for
    /// identical input.
    pub fn touched(&self) -> u64 {
        self.touched
    }

    fn decode_borrowed(&mut self, frame: &[u8]) -> bool {
        let ethernet = match EthernetPacket::new(frame) {
            Some(ethernet) => ethernet,
            None => return false,
        };
        self.fold(u64::from(ethernet.get_ethertype().0));

        match ethernet.get_ethertype() {
            EtherTypes::Ipv4 => {
                if let Some(ipv4) = Ipv4Packet::new(ethernet.payload()) {
                    self.fold(u64::from(ipv4.get_ttl()));
                    self.fold(u64::from(u32::from(ipv4.get_source())));
                    self.transport_borrowed(ipv4.get_next_level_protocol(), ipv4.payload());
                }
            }
            EtherTypes::Ipv6 => {
                if let Some(ipv6) = Ipv6Packet::new(ethernet.payload()) {
                    self.fold(u64::from(ipv6.get_hop_limit()));
                    self.fold(u64::from(ipv6.get_payload_length()));
                    self.transport_borrowed(ipv6.get_next_header(), ipv6.payload());
                }
            }
            _ => {}
        }

        true
    }

    fn transport_borrowed(&mut self, protocol: IpNextHeaderProtocol, payload: &[u8]) {
        match protocol {
            IpNextHeaderProtocols::Tcp => {
                if let Some(tcp) = TcpPacket::new(payload) {
                    self.touch_tcp(&tcp);
                }
            }
            IpNextHeaderProtocols::Udp => {
                if let Some(udp) = UdpPacket::new(payload) {
                    self.touch_udp(&udp);
                }
            }
            _ => {}
        }
    }

    // Same walk as the borrowed path, but the frame and every inner layer is
    // re-copied into an owned buffer first.
    fn decode_owned(&mut self, frame: &[u8]) -> bool {
        let ethernet = match EthernetPacket::owned(frame.to_vec()) {
            Some(ethernet) => ethernet,
            None => return false,
        };
        self.fold(u64::from(ethernet.get_ethertype().0));

        match ethernet.get_ethertype() {
            EtherTypes::Ipv4 => {
                if let Some(ipv4) = Ipv4Packet::owned(ethernet.payload().to_vec()) {
                    self.fold(u64::from(ipv4.get_ttl()));
                    self.fold(u64::from(u32::from(ipv4.get_source())));
                    self.transport_owned(ipv4.get_next_level_protocol(), ipv4.payload().to_vec());
                }
            }
            EtherTypes::Ipv6 => {
                if let Some(ipv6) = Ipv6Packet::owned(ethernet.payload().to_vec()) {
                    self.fold(u64::from(ipv6.get_hop_limit()));
                    self.fold(u64::from(ipv6.get_payload_length()));
                    self.transport_owned(ipv6.get_next_header(), ipv6.payload().to_vec());
                }
            }
            _ => {}
        }

        true
    }

    fn transport_owned(&mut self, protocol: IpNextHeaderProtocol, payload: Vec<u8>) {
        match protocol {
            IpNextHeaderProtocols::Tcp => {
                if let Some(tcp) = TcpPacket::owned(payload) {
                    self.touch_tcp(&tcp);
                }
            }
            IpNextHeaderProtocols::Udp => {
                if let Some(udp) = UdpPacket::owned(payload) {
                    self.touch_udp(&udp);
                }
            }
            _ => {}
        }
    }

    fn touch_tcp(&mut self, tcp: &TcpPacket) {
        self.fold(u64::from(tcp.get_source()));
        self.fold(u64::from(tcp.get_destination()));
        self.fold(u64::from(tcp.get_sequence()));
    }

    fn touch_udp(&mut self, udp: &UdpPacket) {
        self.fold(u64::from(udp.get_source()));
        self.fold(u64::from(udp.get_destination()));
        self.fold(u64::from(udp.get_length()));
    }

    fn fold(&mut self, value: u64) {
        self.touched = self.touched.wrapping_mul(31).wrapping_add(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ipv4_udp_frame() -> Vec<u8> {
        let payload = b"soak";
        let udp_len = 8 + payload.len() as u16;
        let ip_len = 20 + udp_len;

        let mut frame = Vec::new();
        // Ethernet
        frame.extend_from_slice(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
        frame.extend_from_slice(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        frame.extend_from_slice(&0x0800u16.to_be_bytes());
        // IPv4
        frame.push(0x45);
        frame.push(0);
        frame.extend_from_slice(&ip_len.to_be_bytes());
        frame.extend_from_slice(&[0, 0, 0, 0]);
        frame.push(64); // ttl
        frame.push(17); // udp
        frame.extend_from_slice(&[0, 0]);
        frame.extend_from_slice(&[192, 168, 1, 1]);
        frame.extend_from_slice(&[192, 168, 1, 100]);
        // UDP
        frame.extend_from_slice(&30501u16.to_be_bytes());
        frame.extend_from_slice(&30502u16.to_be_bytes());
        frame.extend_from_slice(&udp_len.to_be_bytes());
        frame.extend_from_slice(&[0, 0]);
        frame.extend_from_slice(payload);
        frame
    }

    fn ipv6_tcp_frame() -> Vec<u8> {
        let mut frame = Vec::new();
        // Ethernet
        frame.extend_from_slice(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
        frame.extend_from_slice(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        frame.extend_from_slice(&0x86ddu16.to_be_bytes());
        // IPv6, 20-byte TCP payload
        frame.extend_from_slice(&[0x60, 0, 0, 0]);
        frame.extend_from_slice(&20u16.to_be_bytes());
        frame.push(6); // tcp
        frame.push(64); // hop limit
        frame.extend_from_slice(&[0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]);
        frame.extend_from_slice(&[0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2]);
        // TCP
        frame.extend_from_slice(&443u16.to_be_bytes());
        frame.extend_from_slice(&51000u16.to_be_bytes());
        frame.extend_from_slice(&7u32.to_be_bytes()); // seq
        frame.extend_from_slice(&0u32.to_be_bytes()); // ack
        frame.push(0x50); // data offset
        frame.push(0x10); // ack flag
        frame.extend_from_slice(&1024u16.to_be_bytes());
        frame.extend_from_slice(&[0, 0, 0, 0]); // checksum + urgent
        frame
    }

    #[test]
    fn test_decode_ipv4_udp() {
        let mut decoder = LayerDecoder::new(DecodeStrategy::Reuse);
        assert!(decoder.decode(&ipv4_udp_frame()));
        assert_ne!(decoder.touched(), 0);
    }

    #[test]
    fn test_decode_ipv6_tcp() {
        let mut decoder = LayerDecoder::new(DecodeStrategy::Reuse);
        assert!(decoder.decode(&ipv6_tcp_frame()));
        assert_ne!(decoder.touched(), 0);
    }

    #[test]
    fn test_strategies_fold_identically() {
        let mut reuse = LayerDecoder::new(DecodeStrategy::Reuse);
        let mut full = LayerDecoder::new(DecodeStrategy::Full);

        for frame in [ipv4_udp_frame(), ipv6_tcp_frame()] {
            assert!(reuse.decode(&frame));
            assert!(full.decode(&frame));
        }

        assert_eq!(reuse.touched(), full.touched());
    }

    #[test]
    fn test_truncated_frame_fails_under_both_strategies() {
        let runt = [0xffu8; 6];
        let mut reuse = LayerDecoder::new(DecodeStrategy::Reuse);
        let mut full = LayerDecoder::new(DecodeStrategy::Full);

        assert!(!reuse.decode(&runt));
        assert!(!full.decode(&runt));
    }

    #[test]
    fn test_unknown_ethertype_still_decodes_outer_layer() {
        let mut frame = ipv4_udp_frame();
        // Rewrite the EtherType to ARP; the walk stops after Ethernet.
        frame[12] = 0x08;
        frame[13] = 0x06;

        let mut decoder = LayerDecoder::new(DecodeStrategy::Reuse);
        assert!(decoder.decode(&frame));
    }

    #[test]
    fn test_decoder_is_reusable_across_packets() {
        let mut decoder = LayerDecoder::new(DecodeStrategy::Reuse);
        let frame = ipv4_udp_frame();

        assert!(decoder.decode(&frame));
        let after_one = decoder.touched();
        assert!(decoder.decode(&frame));
        assert_ne!(decoder.touched(), after_one);
    }
}
