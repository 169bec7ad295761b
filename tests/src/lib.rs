//! End-to-end scans against real sockets on the loopback interface.

mod scanning;
