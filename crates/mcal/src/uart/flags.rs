//! Bit layouts of UCSRA, UCSRB and UCSRC.

use bitflags::bitflags;

bitflags! {
    /// UCSRA: Control and Status Register A.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusA: u8 {
        /// Receive Complete. Set while unread data sits in the receive
        /// buffer; cleared by reading UDR.
        const RXC  = 1 << 7;
        /// Transmit Complete. Set when the shift register has emptied and
        /// there is nothing more in UDR.
        const TXC  = 1 << 6;
        /// Data Register Empty. UDR can take another byte.
        const UDRE = 1 << 5;
        /// Frame Error on the byte currently in the receive buffer.
        const FE   = 1 << 4;
        /// Data OverRun: a frame was lost because the buffer was full.
        const DOR  = 1 << 3;
        /// Parity Error on the byte currently in the receive buffer.
        const PE   = 1 << 2;
        /// Double the transmission speed (asynchronous mode only).
        const U2X  = 1 << 1;
        /// Multi-processor Communication Mode.
        const MPCM = 1 << 0;
    }
}

impl StatusA {
    /// The latched receive error flags: FE, DOR and PE.
    pub const LINE_ERRORS: StatusA = StatusA::FE.union(StatusA::DOR).union(StatusA::PE);

    /// Just the receive error flags of this sample.
    pub fn line_errors(self) -> StatusA {
        self & Self::LINE_ERRORS
    }
}

bitflags! {
    /// UCSRB: Control and Status Register B.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ControlB: u8 {
        /// RX Complete Interrupt Enable.
        const RXCIE = 1 << 7;
        /// TX Complete Interrupt Enable.
        const TXCIE = 1 << 6;
        /// Data Register Empty Interrupt Enable.
        const UDRIE = 1 << 5;
        /// Receiver Enable. Takes over the RxD pin.
        const RXEN  = 1 << 4;
        /// Transmitter Enable. Takes over the TxD pin.
        const TXEN  = 1 << 3;
        /// Character Size bit 2, combined with UCSZ1:0 in UCSRC.
        const UCSZ2 = 1 << 2;
        /// Ninth bit of a received 9-bit frame.
        const RXB8  = 1 << 1;
        /// Ninth bit of a 9-bit frame to transmit.
        const TXB8  = 1 << 0;
    }
}

impl ControlB {
    /// The three interrupt enables.
    pub const INTERRUPTS: ControlB = ControlB::RXCIE.union(ControlB::TXCIE).union(ControlB::UDRIE);

    /// Receiver and transmitter on, no interrupts, no 9-bit frames.
    pub const ENABLE_RX_TX: ControlB = ControlB::RXEN.union(ControlB::TXEN);
}

bitflags! {
    /// UCSRC: Control and Status Register C.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ControlC: u8 {
        /// Register Select. Must be one when writing UCSRC, otherwise the
        /// write lands in UBRRH.
        const URSEL = 1 << 7;
        /// Mode Select: 0 = asynchronous, 1 = synchronous.
        const UMSEL = 1 << 6;
        /// Parity Mode bit 1.
        const UPM1  = 1 << 5;
        /// Parity Mode bit 0.
        const UPM0  = 1 << 4;
        /// Stop Bit Select: 0 = one stop bit, 1 = two.
        const USBS  = 1 << 3;
        /// Character Size bit 1.
        const UCSZ1 = 1 << 2;
        /// Character Size bit 0.
        const UCSZ0 = 1 << 1;
        /// Clock Polarity, synchronous mode only.
        const UCPOL = 1 << 0;
    }
}

impl ControlC {
    /// Asynchronous, 8 data bits, no parity, 1 stop bit, addressed at UCSRC.
    pub const FRAME_8N1: ControlC = ControlC::URSEL.union(ControlC::UCSZ1).union(ControlC::UCSZ0);
}
