use std::net::{Ipv4Addr, UdpSocket};

const ATTEMPTS: usize = 200;

/// Finds `count` distinct free localhost UDP ports
pub fn reserve_ports(count: usize) -> Vec<u16> {
    reserve_port_blocks(count, 1)
}

/// Finds `count` free blocks of `len` consecutive localhost UDP ports and
/// returns the first port of each block. All blocks are held until every
/// block is found, so no port is handed out twice.
pub fn reserve_port_blocks(count: usize, len: u16) -> Vec<u16> {
    assert!(len > 0, "port blocks must not be empty");

    let mut held = Vec::new();
    let mut bases = Vec::with_capacity(count);

    for _ in 0..ATTEMPTS {
        if bases.len() == count {
            return bases;
        }

        let first = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).expect("localhost bind");
        let base = first.local_addr().expect("bound socket address").port();
        if base.checked_add(len - 1).is_none() {
            continue;
        }

        let mut block = vec![first];
        for offset in 1..len {
            match UdpSocket::bind((Ipv4Addr::LOCALHOST, base + offset)) {
                Ok(socket) => block.push(socket),
                Err(_) => break,
            }
        }
        if block.len() == usize::from(len) {
            bases.push(base);
            held.extend(block);
        }
    }

    assert_eq!(bases.len(), count, "could not reserve {} port block(s)", count);
    bases
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_are_disjoint_and_consecutive() {
        let bases = reserve_port_blocks(4, 3);
        let mut ports: Vec<u16> = bases.iter().flat_map(|base| *base..*base + 3).collect();
        ports.sort_unstable();
        ports.dedup();

        assert_eq!(ports.len(), 12);
        for base in bases {
            for port in base..base + 3 {
                UdpSocket::bind((Ipv4Addr::LOCALHOST, port)).unwrap();
            }
        }
    }
}
