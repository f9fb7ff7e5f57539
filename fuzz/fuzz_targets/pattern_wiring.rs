#![no_main]

use std::collections::HashSet;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use portweave_pattern::Pattern;

#[derive(Arbitrary, Debug)]
enum Op {
    Connect { from: u8, src: (u8, u8), to: u8, dst: (u8, u8) },
    ConnectEach { from: u8, src: (u8, u8), to: u8, dst: (u8, u8) },
    Disconnect { from: u8, src: (u8, u8), to: u8, dst: (u8, u8) },
    Clear,
}

const GROUPS: u8 = 3;
const PORTS: u8 = 8;

fn range(group: u8, (a, b): (u8, u8)) -> String {
    let start = a % PORTS;
    let stop = start + 1 + b % (PORTS - start);
    format!("/g{}[{}:{}]", group % GROUPS, start, stop)
}

fuzz_target!(|ops: Vec<Op>| {
    let Ok(mut p) = Pattern::new(&["/g0[0:8]", "/g1[0:8]", "/g2[0:8]"]) else {
        return;
    };
    for op in ops {
        let before = p.clone();
        let outcome = match op {
            Op::Connect { from, src, to, dst } => p.connect(range(from, src), range(to, dst), &[], 1),
            Op::ConnectEach { from, src, to, dst } => {
                p.connect_each(range(from, src), range(to, dst), &[], 1)
            }
            Op::Disconnect { from, src, to, dst } => {
                p.disconnect(range(from, src), range(to, dst)).map(|_| ())
            }
            Op::Clear => {
                p.clear();
                Ok(())
            }
        };
        if outcome.is_err() {
            assert!(p == before, "rejected operation changed the pattern");
        }

        let mut dests = HashSet::new();
        for ((s, d), _) in p.edges() {
            assert!(dests.insert(d.clone()), "fan-in on {}", d);
            assert_ne!(p.interface().group_of(s), p.interface().group_of(d));
        }
    }
});
