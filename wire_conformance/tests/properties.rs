/* Properties every generated format must satisfy: round trips, rejection of
 * truncated or extended input, and range enforcement on encode. */

use proptest::collection::vec;
use proptest::prelude::*;
use wire_conformance::arrays::{self, SimpleArray, WordList};
use wire_conformance::nested::{self, Point, Polygon};
use wire_conformance::recursive::{self, Node, NodeNext};
use wire_conformance::socks5::{self, ClientRequest, ClientRequestDestAddr};
use wire_conformance::strings::{self, Greeting};
use wire_conformance::unions::{self, Message, MessagePayload, Tagged};

fn simple_array() -> impl Strategy<Value = SimpleArray> {
    vec(any::<u8>(), 0..64).prop_map(|data| SimpleArray { count: data.len() as u8, data })
}

fn polygon() -> impl Strategy<Value = Polygon> {
    vec((any::<u16>(), any::<u16>()), 0..16).prop_map(|points| Polygon {
        n: points.len() as u8,
        points: points.into_iter().map(|(x, y)| Point { x, y }).collect(),
    })
}

fn dest_addr() -> impl Strategy<Value = (u8, ClientRequestDestAddr)> {
    prop_oneof![
        any::<u32>().prop_map(|ipv4| (1, ClientRequestDestAddr::AtypeIpv4 { ipv4 })),
        vec(any::<u8>(), 0..32).prop_map(|name| {
            (3, ClientRequestDestAddr::AtypeDomainname { len: name.len() as u8, name })
        }),
        any::<[u8; 16]>().prop_map(|ipv6| (4, ClientRequestDestAddr::AtypeIpv6 { ipv6 })),
    ]
}

fn client_request() -> impl Strategy<Value = ClientRequest> {
    (1u8..=3, dest_addr(), any::<u16>()).prop_map(|(command, (atype, dest_addr), dest_port)| ClientRequest {
        version: 5,
        command,
        reserved: 0,
        atype,
        dest_addr,
        dest_port,
    })
}

fn node(depth: usize) -> Node {
    (0..depth).fold(Node { value: 0, more: 0, next: NodeNext::Case0 }, |child, level| Node {
        value: level as u8 + 1,
        more: 1,
        next: NodeNext::Case1 { child: Box::new(child) },
    })
}

proptest! {
    #[test]
    fn simple_array_round_trips(value in simple_array()) {
        let bytes = value.encode().unwrap();
        prop_assert_eq!(bytes.len(), value.data.len() + 1);
        let (decoded, rest) = SimpleArray::decode(&bytes).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert!(rest.is_empty());
    }

    #[test]
    fn simple_array_rejects_prefixes(value in simple_array()) {
        let bytes = value.encode().unwrap();
        for len in 0..bytes.len() {
            prop_assert_eq!(SimpleArray::decode(&bytes[..len]), Err(arrays::Error::TruncatedInput));
        }
    }

    #[test]
    fn simple_array_rejects_trailing_bytes(value in simple_array()) {
        let mut bytes = value.encode().unwrap();
        bytes.push(0);
        prop_assert_eq!(SimpleArray::parse(&bytes), Err(arrays::Error::TrailingData));
    }

    #[test]
    fn simple_array_count_must_match(data in vec(any::<u8>(), 0..16), count in any::<u8>()) {
        prop_assume!(count as usize != data.len());
        let value = SimpleArray { count, data };
        prop_assert_eq!(value.encode(), Err(arrays::Error::LengthConstraintViolation));
    }

    #[test]
    fn word_list_round_trips(words in vec(any::<u16>(), 0..32)) {
        let value = WordList { n: words.len() as u8, words };
        let bytes = value.encode().unwrap();
        prop_assert_eq!(WordList::parse(&bytes).unwrap(), value);
    }

    #[test]
    fn greeting_round_trips(text in "[a-zA-Z0-9 ]{0,32}", tail in any::<u8>()) {
        let value = Greeting { text, tail };
        let mut bytes = value.encode().unwrap();
        prop_assert_eq!(Greeting::parse(&bytes).unwrap(), value);

        bytes.push(0);
        prop_assert_eq!(Greeting::parse(&bytes), Err(strings::Error::TrailingData));
    }

    #[test]
    fn polygon_round_trips_and_rejects_prefixes(value in polygon()) {
        let bytes = value.encode().unwrap();
        prop_assert_eq!(Polygon::parse(&bytes).unwrap(), value);
        for len in 0..bytes.len() {
            prop_assert_eq!(Polygon::decode(&bytes[..len]), Err(nested::Error::TruncatedInput));
        }
    }

    #[test]
    fn client_request_round_trips(value in client_request()) {
        let mut bytes = value.encode().unwrap();
        let (decoded, rest) = ClientRequest::decode(&bytes).unwrap();
        prop_assert_eq!(&decoded, &value);
        prop_assert!(rest.is_empty());

        for len in 0..bytes.len() {
            prop_assert_eq!(ClientRequest::decode(&bytes[..len]), Err(socks5::Error::TruncatedInput));
        }

        bytes.push(0);
        prop_assert_eq!(ClientRequest::parse(&bytes), Err(socks5::Error::TrailingData));
    }

    #[test]
    fn client_request_command_is_enforced(value in client_request(), command in 4u8..=255) {
        let invalid = ClientRequest { command, ..value };
        prop_assert_eq!(invalid.encode(), Err(socks5::Error::ConstraintViolation));
    }

    #[test]
    fn client_request_version_is_enforced(value in client_request(), version in any::<u8>()) {
        prop_assume!(version != 5);
        let invalid = ClientRequest { version, ..value };
        prop_assert_eq!(invalid.encode(), Err(socks5::Error::ConstraintViolation));
    }

    #[test]
    fn tagged_rejects_unknown_tags(tag in 3u8..=255, byte in any::<u8>()) {
        let unknown = [tag, byte];
        prop_assert_eq!(Tagged::decode(&unknown), Err(unions::Error::DisallowedCase));
        let disallowed = [0, byte];
        prop_assert_eq!(Tagged::decode(&disallowed), Err(unions::Error::DisallowedCase));
    }

    #[test]
    fn message_numbers_round_trip(tag in prop_oneof![2u8..=4, Just(9u8)], numbers in vec(any::<u16>(), 0..32), checksum in any::<u8>()) {
        let value = Message {
            r#type: tag,
            len: (numbers.len() * 2) as u8,
            payload: MessagePayload::Group1 { numbers },
            checksum,
        };
        let bytes = value.encode().unwrap();
        prop_assert_eq!(Message::parse(&bytes).unwrap(), value);
    }

    #[test]
    fn node_chains_round_trip(depth in 0usize..16) {
        let value = node(depth);
        let bytes = value.encode().unwrap();
        prop_assert_eq!(bytes.len(), 2 * (depth + 1));
        prop_assert_eq!(Node::parse(&bytes).unwrap(), value);

        let prefix = &bytes[..bytes.len() - 1];
        prop_assert_eq!(Node::decode(prefix), Err(recursive::Error::TruncatedInput));
    }
}
